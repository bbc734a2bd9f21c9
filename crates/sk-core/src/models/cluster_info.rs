//! Cluster description handed to every client on its command line.
//!
//! Wire form: `name,tsaPort,groupPort;name,tsaPort,groupPort;...`
//! Server names must not contain `,` or `;`.

use crate::{CoreError, CoreErrorResult, ServerInfo};

use std::str::FromStr;

use serde::{Deserialize, Serialize};

const RECORD_SEPARATOR: char = ';';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterInfo {
    servers: Vec<ServerInfo>,
}

impl ClusterInfo {
    pub fn new(servers: Vec<ServerInfo>) -> Self {
        Self { servers }
    }

    pub fn servers(&self) -> &[ServerInfo] {
        &self.servers
    }

    pub fn server(&self, name: &str) -> Option<&ServerInfo> {
        self.servers.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn encode(&self) -> String {
        self.servers
            .iter()
            .map(ServerInfo::encode)
            .collect::<Vec<_>>()
            .join(&RECORD_SEPARATOR.to_string())
    }

    #[track_caller]
    pub fn decode(encoded: &str) -> CoreErrorResult<Self> {
        if encoded.is_empty() {
            return Err(CoreError::cluster_info("no servers in cluster info"));
        }

        let servers = encoded
            .split(RECORD_SEPARATOR)
            .map(ServerInfo::decode)
            .collect::<CoreErrorResult<Vec<_>>>()?;

        Ok(Self { servers })
    }

    /// Connection URI over every server's TSA port, e.g. `terracotta://localhost:9410,localhost:9411`.
    pub fn connect_uri(&self, scheme: &str, host: &str) -> String {
        let hosts = self
            .servers
            .iter()
            .map(|s| format!("{host}:{}", s.tsa_port))
            .collect::<Vec<_>>()
            .join(",");
        format!("{scheme}://{hosts}")
    }
}

impl FromStr for ClusterInfo {
    type Err = CoreError;

    #[track_caller]
    fn from_str(s: &str) -> CoreErrorResult<Self> {
        Self::decode(s)
    }
}

impl std::fmt::Display for ClusterInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}
