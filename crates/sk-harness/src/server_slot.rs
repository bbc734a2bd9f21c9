use sk_core::ServerMode;

use serde::Serialize;

/// The interlock's record of one server.
#[derive(Debug, Clone, Serialize)]
pub struct ServerSlot {
    pub name: String,
    pub generation: u64,
    pub mode: ServerMode,
    pub pid: Option<u32>,
    /// Last PID seen, kept after termination for reporting
    pub last_pid: Option<u32>,
    pub crash_expected: bool,
}

impl ServerSlot {
    pub fn new(name: String, crash_expected: bool) -> Self {
        Self {
            name,
            generation: 0,
            mode: ServerMode::Terminated,
            pid: None,
            last_pid: None,
            crash_expected,
        }
    }
}

impl std::fmt::Display for ServerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}", self.name, self.mode)?;
        if let Some(pid) = self.pid {
            write!(f, " pid={pid}")?;
        }
        if self.generation > 0 {
            write!(f, " gen={}", self.generation)?;
        }
        write!(f, "]")
    }
}
