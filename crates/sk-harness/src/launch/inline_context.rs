use crate::launch::StopSignal;

use std::io::{PipeWriter, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// What an in-process server body sees of the harness: its output pipes and
/// its stop signal.
pub struct InlineContext {
    name: String,
    index: u32,
    pid: u32,
    stdout: Mutex<PipeWriter>,
    stderr: Mutex<PipeWriter>,
    stop: Arc<StopSignal>,
}

impl InlineContext {
    pub(crate) fn new(
        name: String,
        index: u32,
        pid: u32,
        stdout: PipeWriter,
        stderr: PipeWriter,
        stop: Arc<StopSignal>,
    ) -> Self {
        Self {
            name,
            index,
            pid,
            stdout: Mutex::new(stdout),
            stderr: Mutex::new(stderr),
            stop,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Synthetic PID this run of the body was given.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Write one line to the server's stdout. A closed reader is ignored.
    pub fn out(&self, line: &str) {
        let mut stdout = self.stdout.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(stdout, "{line}").and_then(|()| stdout.flush());
    }

    pub fn err(&self, line: &str) {
        let mut stderr = self.stderr.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(stderr, "{line}").and_then(|()| stderr.flush());
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.is_raised()
    }

    /// Sleep until killed or `timeout` passes; returns whether it was killed.
    pub fn wait_for_stop(&self, timeout: Duration) -> bool {
        self.stop.wait_timeout(timeout)
    }
}
