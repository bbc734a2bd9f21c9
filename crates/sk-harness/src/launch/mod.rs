//! How a server unit's process comes into being.
//!
//! The unit owns the state machine and the trigger scanner; a launcher only
//! produces the two output streams and something to wait on for the exit.

mod external_launcher;
mod inline_context;
mod inline_launcher;
mod platform_kill;
mod process_command;
mod stop_signal;

pub use external_launcher::ExternalLauncher;
pub use inline_context::InlineContext;
pub use inline_launcher::{InlineBody, InlineExit, InlineLauncher};
pub use platform_kill::kill_process;
pub use process_command::ProcessCommand;
pub use stop_signal::StopSignal;

use crate::HarnessResult;

use std::io::Read;
use std::path::PathBuf;

/// What a launcher needs to know about the server it starts.
#[derive(Debug, Clone)]
pub struct LaunchContext {
    pub name: String,
    pub index: u32,
    pub working_dir: PathBuf,
}

/// A server that has been started but not yet waited for.
pub struct LaunchedServer {
    pub stdout: Box<dyn Read + Send>,
    pub stderr: Box<dyn Read + Send>,
    pub exit: Box<dyn ExitWait>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The server is gone; `status` describes how it ended.
    Exited { status: String },
    /// The server asked to be relaunched on the same watcher.
    RestartInPlace,
}

pub trait ExitWait: Send {
    fn wait(self: Box<Self>) -> ExitOutcome;
}

pub trait ServerLauncher: Send + Sync {
    fn launch(&self, ctx: &LaunchContext) -> HarnessResult<LaunchedServer>;

    /// Kill the process that reported `pid`. Killing a process that is
    /// already gone is not an error.
    fn kill(&self, pid: u32) -> HarnessResult<()>;

    /// A one-shot unit cannot be started again once it has terminated.
    fn is_one_shot(&self) -> bool;
}
