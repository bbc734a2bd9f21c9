use crate::launch::{
    ExitOutcome, ExitWait, LaunchContext, LaunchedServer, ProcessCommand, ServerLauncher,
    kill_process,
};
use crate::{HarnessError, HarnessResult};

use sk_config::StripeConfig;

use std::io;
use std::process::{Child, Command, Stdio};

use log::info;

/// Runs each server as an OS process in its own working directory.
#[derive(Debug, Clone)]
pub struct ExternalLauncher {
    stripe: StripeConfig,
}

impl ExternalLauncher {
    pub fn new(stripe: StripeConfig) -> Self {
        Self { stripe }
    }
}

impl ServerLauncher for ExternalLauncher {
    fn launch(&self, ctx: &LaunchContext) -> HarnessResult<LaunchedServer> {
        let command = ProcessCommand::for_server(&self.stripe, ctx.index);
        info!("Launching {}: {command}", ctx.name);

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&ctx.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| HarnessError::spawn(command.program.clone(), e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("server stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("server stderr was not captured"))?;
        info!("{} spawned as OS process {}", ctx.name, child.id());

        Ok(LaunchedServer {
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            exit: Box::new(ChildExit(child)),
        })
    }

    fn kill(&self, pid: u32) -> HarnessResult<()> {
        kill_process(pid)
    }

    fn is_one_shot(&self) -> bool {
        true
    }
}

struct ChildExit(Child);

impl ExitWait for ChildExit {
    fn wait(mut self: Box<Self>) -> ExitOutcome {
        let status = match self.0.wait() {
            Ok(status) => status.to_string(),
            Err(e) => format!("wait failed: {e}"),
        };
        ExitOutcome::Exited { status }
    }
}
