use crate::FailureCause;

use serde::Serialize;

/// Outcome of a run. Moves from `Running` to `Passed` or `Failed`; a
/// failure is never replaced, and a failure reported after a pass still wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "cause", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    #[default]
    Running,
    Passed,
    Failed(FailureCause),
}

impl Verdict {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn cause(&self) -> Option<&FailureCause> {
        match self {
            Self::Failed(cause) => Some(cause),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Passed => "PASSED",
            Self::Failed(_) => "FAILED",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed(cause) => write!(f, "FAILED ({cause})"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}
