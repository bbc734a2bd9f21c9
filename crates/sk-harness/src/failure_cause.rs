use serde::Serialize;

/// Why a run failed. The first cause recorded is the one reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureCause {
    SetupClient {
        exit_code: Option<i32>,
    },
    DestroyClient {
        exit_code: Option<i32>,
    },
    TestClient {
        client: String,
        exit_code: Option<i32>,
    },
    UnexpectedServerCrash {
        server: String,
        pid: u32,
        status: String,
    },
    /// Exited before ever reporting a PID
    CrashedBeforePid {
        server: String,
        status: String,
    },
    LogSeverity {
        unit: String,
        line: String,
    },
    InvariantViolation {
        message: String,
    },
    Interrupted {
        signal: i32,
    },
    Harness {
        message: String,
    },
}

impl FailureCause {
    pub fn harness<M: Into<String>>(message: M) -> Self {
        Self::Harness {
            message: message.into(),
        }
    }
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {code}"),
        None => String::from("no exit code"),
    }
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SetupClient { exit_code } => {
                write!(f, "ERROR in setup client ({})", describe_exit(exit_code))
            }
            Self::DestroyClient { exit_code } => {
                write!(f, "ERROR in destroy client ({})", describe_exit(exit_code))
            }
            Self::TestClient { client, exit_code } => {
                write!(f, "ERROR in {client} ({})", describe_exit(exit_code))
            }
            Self::UnexpectedServerCrash {
                server,
                pid,
                status,
            } => write!(
                f,
                "Unexpected server crash: {server} (PID {pid}) status: {status}"
            ),
            Self::CrashedBeforePid { server, status } => write!(
                f,
                "Server crashed before reporting PID: {server} status: {status}"
            ),
            Self::LogSeverity { unit, line } => {
                write!(f, "Severe log line from {unit}: {line}")
            }
            Self::InvariantViolation { message } => {
                write!(f, "Harness invariant violated: {message}")
            }
            Self::Interrupted { signal } => write!(f, "Interrupted by signal {signal}"),
            Self::Harness { message } => write!(f, "Harness error: {message}"),
        }
    }
}
