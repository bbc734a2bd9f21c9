use std::panic::Location;
use std::result::Result as StdResult;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid server mode: {value} {location}")]
    InvalidServerMode {
        value: String,
        location: ErrorLocation,
    },

    #[error("Invalid client role: {value} {location}")]
    InvalidClientRole {
        value: String,
        location: ErrorLocation,
    },

    #[error("Malformed cluster info: {message} {location}")]
    ClusterInfoFormat {
        message: String,
        location: ErrorLocation,
    },

    #[error("Harness refused {opcode}: {message} {location}")]
    ControlFatal {
        opcode: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Control channel closed while waiting for ACK:{opcode} {location}")]
    ControlChannelClosed {
        opcode: String,
        location: ErrorLocation,
    },

    #[error("IO error: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },
}

impl CoreError {
    /// Create a cluster info format error
    #[track_caller]
    pub fn cluster_info<S: Into<String>>(message: S) -> Self {
        CoreError::ClusterInfoFormat {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for CoreError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = StdResult<T, CoreError>;
