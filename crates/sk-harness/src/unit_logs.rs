use crate::HarnessResult;

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// The two log files of one unit: `stdout.log` and `stderr.log` in its directory.
///
/// Files are opened for append so restarts and replacement units keep the
/// earlier output. They close when the sinks are dropped.
#[derive(Debug)]
pub struct UnitLogs {
    pub stdout: File,
    pub stderr: File,
}

impl UnitLogs {
    pub const STDOUT_FILE: &'static str = "stdout.log";
    pub const STDERR_FILE: &'static str = "stderr.log";

    pub fn open(dir: &Path) -> HarnessResult<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            stdout: Self::open_one(dir.join(Self::STDOUT_FILE))?,
            stderr: Self::open_one(dir.join(Self::STDERR_FILE))?,
        })
    }

    fn open_one(path: PathBuf) -> HarnessResult<File> {
        Ok(OpenOptions::new().create(true).append(true).open(path)?)
    }

    pub fn into_sinks(self) -> (Box<dyn Write + Send>, Box<dyn Write + Send>) {
        (Box::new(self.stdout), Box::new(self.stderr))
    }
}
