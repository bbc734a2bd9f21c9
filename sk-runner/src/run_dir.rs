use crate::error::{Result as RunnerResult, RunnerError};

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

const RUN_DIR_PREFIX: &str = "run-";
const MAX_ATTEMPTS: u32 = 100;

/// `run-YYYYmmdd-HHMMSS`
pub fn run_dir_name(started: DateTime<Local>) -> String {
    format!("{RUN_DIR_PREFIX}{}", started.format("%Y%m%d-%H%M%S"))
}

/// Create a fresh run directory under `root`.
///
/// Runs started within the same second get a `-<n>` suffix.
pub fn create(root: &Path, started: DateTime<Local>) -> RunnerResult<PathBuf> {
    fs::create_dir_all(root)?;
    let base = run_dir_name(started);

    for attempt in 0..MAX_ATTEMPTS {
        let candidate = match attempt {
            0 => root.join(&base),
            n => root.join(format!("{base}-{n}")),
        };
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(RunnerError::run_dir(
        root.display().to_string(),
        format!("{base} and its {MAX_ATTEMPTS} suffixed variants all exist"),
    ))
}
