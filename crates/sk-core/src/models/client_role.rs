use crate::{CoreError, CoreErrorResult};

use std::panic::Location;
use std::str::FromStr;

use clap::ValueEnum;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// Which phase a client test process runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientRole {
    #[value(name = "SETUP")]
    Setup,
    #[value(name = "TEST")]
    Test,
    #[value(name = "DESTROY")]
    Destroy,
}

impl ClientRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "SETUP",
            Self::Test => "TEST",
            Self::Destroy => "DESTROY",
        }
    }
}

impl FromStr for ClientRole {
    type Err = CoreError;

    #[track_caller]
    fn from_str(s: &str) -> CoreErrorResult<Self> {
        match s {
            "SETUP" => Ok(Self::Setup),
            "TEST" => Ok(Self::Test),
            "DESTROY" => Ok(Self::Destroy),
            _ => Err(CoreError::InvalidClientRole {
                value: s.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

impl std::fmt::Display for ClientRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
