use crate::{HarnessError, HarnessResult};

/// SIGKILL on Unix. A process that no longer exists counts as killed.
#[cfg(unix)]
#[track_caller]
pub fn kill_process(pid: u32) -> HarnessResult<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).map_err(|_| HarnessError::kill(pid, "PID out of range"))?;
    match kill(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(HarnessError::kill(pid, e.to_string())),
    }
}

/// `taskkill /F /T` on Windows, taking the process tree with it.
#[cfg(windows)]
#[track_caller]
pub fn kill_process(pid: u32) -> HarnessResult<()> {
    // taskkill exits with 128 when the process is already gone
    const NOT_FOUND: i32 = 128;

    let output = std::process::Command::new("taskkill")
        .args(["/F", "/T", "/PID", &pid.to_string()])
        .output()?;
    match output.status.code() {
        Some(0) | Some(NOT_FOUND) => Ok(()),
        _ => Err(HarnessError::kill(
            pid,
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        )),
    }
}
