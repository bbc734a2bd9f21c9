use serde::{Deserialize, Serialize};

/// Requests a client can make of the harness through the control protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlOpcode {
    /// No-op barrier
    Synchronize,
    TerminateActive,
    TerminateOnePassive,
    TerminateOneDiagnostic,
    StartOneServer,
    StartAllServers,
    ShutDownStripe,
    WaitForActive,
    WaitForPassivesInStandby,
    /// Acknowledged without any action
    ClientShutdown,
}

impl ControlOpcode {
    pub const ALL: [ControlOpcode; 10] = [
        Self::Synchronize,
        Self::TerminateActive,
        Self::TerminateOnePassive,
        Self::TerminateOneDiagnostic,
        Self::StartOneServer,
        Self::StartAllServers,
        Self::ShutDownStripe,
        Self::WaitForActive,
        Self::WaitForPassivesInStandby,
        Self::ClientShutdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Synchronize => "SYNC",
            Self::TerminateActive => "TERMINATE_ACTIVE",
            Self::TerminateOnePassive => "TERMINATE_ONE_PASSIVE",
            Self::TerminateOneDiagnostic => "TERMINATE_ONE_DIAGNOSTIC",
            Self::StartOneServer => "START_ONE_SERVER",
            Self::StartAllServers => "START_ALL_SERVERS",
            Self::ShutDownStripe => "SHUT_DOWN_STRIPE",
            Self::WaitForActive => "WAIT_FOR_ACTIVE",
            Self::WaitForPassivesInStandby => "WAIT_FOR_PASSIVES",
            Self::ClientShutdown => "CLIENT_SHUTDOWN",
        }
    }

    /// Unrecognized opcodes are `None` so both sides can skip them.
    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == s)
    }
}

impl std::fmt::Display for ControlOpcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
