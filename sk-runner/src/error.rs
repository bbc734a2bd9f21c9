use std::panic::Location;
use std::result::Result as StdResult;

use error_location::ErrorLocation;
use sk_config::ConfigError;
use sk_harness::HarnessError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Harness(#[from] HarnessError),

    #[error("Failed to initialize logger: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },

    #[error("Could not create a run directory under {root}: {message} {location}")]
    RunDir {
        root: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("IO error: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },
}

impl RunnerError {
    #[track_caller]
    pub fn logger<S: Into<String>>(message: S) -> Self {
        Self::Logger {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn run_dir<R: Into<String>, S: Into<String>>(root: R, message: S) -> Self {
        Self::RunDir {
            root: root.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for RunnerError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = StdResult<T, RunnerError>;
