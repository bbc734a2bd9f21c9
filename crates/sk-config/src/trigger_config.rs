use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;

/// Log phrases the harness recognizes in server and client output.
///
/// The defaults match what an unmodified server prints; all matching is
/// case-sensitive substring matching.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Followed by the decimal process id
    pub pid: String,
    pub bootstrap: String,
    pub active: String,
    pub passive: String,
    pub diagnostic: String,
    pub zap: String,
    /// Markers of warning/error lines
    pub severity_markers: Vec<String>,
    /// Severity lines containing any of these are never failures
    pub severity_allow_list: Vec<String>,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            pid: String::from("PID is"),
            bootstrap: String::from("Server is listening on"),
            active: String::from("Terracotta Server instance has started up as ACTIVE node"),
            passive: String::from("Moved to State[ PASSIVE-STANDBY ]"),
            diagnostic: String::from("Started the server in diagnostic mode"),
            zap: String::from("Restarting the server"),
            severity_markers: vec![String::from(" WARN "), String::from(" ERROR ")],
            severity_allow_list: vec![String::from("com.tc.net.")],
        }
    }
}

impl TriggerConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        let phrases = [
            ("pid", &self.pid),
            ("bootstrap", &self.bootstrap),
            ("active", &self.active),
            ("passive", &self.passive),
            ("diagnostic", &self.diagnostic),
            ("zap", &self.zap),
        ];

        for (field, phrase) in phrases {
            if phrase.is_empty() {
                return Err(ConfigError::triggers(format!(
                    "triggers.{field} must not be empty"
                )));
            }
        }

        if self.severity_markers.iter().any(String::is_empty) {
            return Err(ConfigError::triggers(
                "triggers.severity_markers must not contain empty markers",
            ));
        }

        Ok(())
    }
}
