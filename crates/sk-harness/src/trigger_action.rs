/// What a matched trigger phrase means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerAction {
    /// `PID is <n>`
    Pid,
    /// Listening for connections, role not known yet
    Bootstrap,
    Active,
    Passive,
    Diagnostic,
    /// Internal restart without a process exit
    Zap,
    /// Warning or error line
    Severity,
    /// Control protocol request from a client
    Control,
}
