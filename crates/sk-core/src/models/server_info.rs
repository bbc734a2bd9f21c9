use crate::{CoreError, CoreErrorResult};

use std::str::FromStr;

use serde::{Deserialize, Serialize};

const FIELD_SEPARATOR: char = ',';

/// One server's entry in the cluster info: `name,tsaPort,groupPort`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub tsa_port: u16,
    pub group_port: u16,
}

impl ServerInfo {
    pub fn new<S: Into<String>>(name: S, tsa_port: u16, group_port: u16) -> Self {
        Self {
            name: name.into(),
            tsa_port,
            group_port,
        }
    }

    pub fn encode(&self) -> String {
        format!(
            "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
            self.name, self.tsa_port, self.group_port
        )
    }

    #[track_caller]
    pub fn decode(record: &str) -> CoreErrorResult<Self> {
        let fields: Vec<&str> = record.split(FIELD_SEPARATOR).collect();
        if fields.len() != 3 {
            return Err(CoreError::cluster_info(format!(
                "expected name,tsaPort,groupPort but got \"{record}\""
            )));
        }

        let name = fields[0];
        if name.is_empty() {
            return Err(CoreError::cluster_info(format!(
                "empty server name in \"{record}\""
            )));
        }

        let tsa_port = parse_port(fields[1], record)?;
        let group_port = parse_port(fields[2], record)?;

        Ok(Self::new(name, tsa_port, group_port))
    }
}

impl FromStr for ServerInfo {
    type Err = CoreError;

    #[track_caller]
    fn from_str(s: &str) -> CoreErrorResult<Self> {
        Self::decode(s)
    }
}

#[track_caller]
fn parse_port(value: &str, record: &str) -> CoreErrorResult<u16> {
    value
        .parse()
        .map_err(|_| CoreError::cluster_info(format!("bad port \"{value}\" in \"{record}\"")))
}
