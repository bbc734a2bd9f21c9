use crate::{CoreError, CoreErrorResult};

use std::panic::Location;
use std::str::FromStr;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// Logical state of one server unit, inferred from its log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMode {
    /// Not running. Initial and terminal state of every run of a unit.
    #[default]
    Terminated,
    /// Launch requested, nothing observed yet
    Startup,
    /// Alive and accepting connections, role not reported yet
    Unknown,
    Active,
    Passive,
    Diagnostic,
    /// Internal forced restart, treated like a return to `Startup`
    Zapped,
}

impl ServerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Terminated => "TERMINATED",
            Self::Startup => "STARTUP",
            Self::Unknown => "UNKNOWN",
            Self::Active => "ACTIVE",
            Self::Passive => "PASSIVE",
            Self::Diagnostic => "DIAGNOSTIC",
            Self::Zapped => "ZAPPED",
        }
    }

    /// `Startup` and `Zapped`: the unit is launching and has not announced itself.
    pub fn is_transitional(&self) -> bool {
        matches!(self, Self::Startup | Self::Zapped)
    }

    /// A role has been reported.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Active | Self::Passive | Self::Diagnostic)
    }

    /// Anything but `Terminated`.
    pub fn is_running(&self) -> bool {
        !matches!(self, Self::Terminated)
    }

    /// Running but without a reported role yet.
    pub fn is_settling(&self) -> bool {
        self.is_running() && !self.is_ready()
    }
}

impl FromStr for ServerMode {
    type Err = CoreError;

    #[track_caller]
    fn from_str(s: &str) -> CoreErrorResult<Self> {
        match s {
            "TERMINATED" => Ok(Self::Terminated),
            "STARTUP" => Ok(Self::Startup),
            "UNKNOWN" => Ok(Self::Unknown),
            "ACTIVE" => Ok(Self::Active),
            "PASSIVE" => Ok(Self::Passive),
            "DIAGNOSTIC" => Ok(Self::Diagnostic),
            "ZAPPED" => Ok(Self::Zapped),
            _ => Err(CoreError::InvalidServerMode {
                value: s.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

impl std::fmt::Display for ServerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
