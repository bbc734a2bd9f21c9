use crate::FailureCause;

use std::panic::Location;
use std::result::Result as StdResult;

use error_location::ErrorLocation;
use sk_config::ConfigError;
use sk_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Test failed: {cause} {location}")]
    TestFailed {
        cause: FailureCause,
        location: ErrorLocation,
    },

    #[error("Registration refused for {unit}: {message} {location}")]
    Registration {
        unit: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("no active server {location}")]
    NoActiveServer { location: ErrorLocation },

    #[error("Failed to spawn {program}: {source} {location}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("IO error: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed to kill PID {pid}: {message} {location}")]
    Kill {
        pid: u32,
        message: String,
        location: ErrorLocation,
    },

    #[error("Stale handle for {unit} (generation {generation}) {location}")]
    StaleHandle {
        unit: String,
        generation: u64,
        location: ErrorLocation,
    },

    #[error("{unit} is already running {location}")]
    AlreadyRunning {
        unit: String,
        location: ErrorLocation,
    },

    #[error("{unit} cannot be started twice {location}")]
    OneShotReused {
        unit: String,
        location: ErrorLocation,
    },

    #[error("Admission token mismatch on {unit} {location}")]
    AdmissionMismatch {
        unit: String,
        location: ErrorLocation,
    },

    #[error("Forced shutdown did not finish within {timeout_secs}s {location}\n{state}")]
    ForceShutdownTimeout {
        timeout_secs: u64,
        state: String,
        location: ErrorLocation,
    },

    #[error("Interlock invariant violated: {message} {location}")]
    InvariantViolation {
        message: String,
        location: ErrorLocation,
    },

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl HarnessError {
    #[track_caller]
    pub fn test_failed(cause: FailureCause) -> Self {
        Self::TestFailed {
            cause,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn registration<U: Into<String>, M: Into<String>>(unit: U, message: M) -> Self {
        Self::Registration {
            unit: unit.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn no_active_server() -> Self {
        Self::NoActiveServer {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn spawn<P: Into<String>>(program: P, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn kill<M: Into<String>>(pid: u32, message: M) -> Self {
        Self::Kill {
            pid,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn stale_handle<U: Into<String>>(unit: U, generation: u64) -> Self {
        Self::StaleHandle {
            unit: unit.into(),
            generation,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn already_running<U: Into<String>>(unit: U) -> Self {
        Self::AlreadyRunning {
            unit: unit.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn one_shot_reused<U: Into<String>>(unit: U) -> Self {
        Self::OneShotReused {
            unit: unit.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn admission_mismatch<U: Into<String>>(unit: U) -> Self {
        Self::AdmissionMismatch {
            unit: unit.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn force_shutdown_timeout<S: Into<String>>(timeout_secs: u64, state: S) -> Self {
        Self::ForceShutdownTimeout {
            timeout_secs,
            state: state.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invariant<M: Into<String>>(message: M) -> Self {
        Self::InvariantViolation {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// A wait that ended because the run had already failed.
    pub fn is_test_failure(&self) -> bool {
        matches!(self, Self::TestFailed { .. })
    }
}

impl From<std::io::Error> for HarnessError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = StdResult<T, HarnessError>;
