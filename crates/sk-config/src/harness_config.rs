use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_FAIL_ON_LOG_SEVERITY,
    DEFAULT_FORCE_SHUTDOWN_TIMEOUT_SECS, DEFAULT_RUN_DIR,
};

use serde::Deserialize;

pub const MIN_FORCE_SHUTDOWN_TIMEOUT_SECS: u64 = 1;
pub const MAX_FORCE_SHUTDOWN_TIMEOUT_SECS: u64 = 3600;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Root under which every run gets its own `run-<timestamp>` directory
    pub run_dir: String,
    /// Fail the run on warning/error lines in any unit's output
    pub fail_on_log_severity: bool,
    /// Budget for the forced shutdown sweep
    pub force_shutdown_timeout_secs: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            run_dir: String::from(DEFAULT_RUN_DIR),
            fail_on_log_severity: DEFAULT_FAIL_ON_LOG_SEVERITY,
            force_shutdown_timeout_secs: DEFAULT_FORCE_SHUTDOWN_TIMEOUT_SECS,
        }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.run_dir.trim().is_empty() {
            return Err(ConfigError::harness("harness.run_dir must not be empty"));
        }

        if self.force_shutdown_timeout_secs < MIN_FORCE_SHUTDOWN_TIMEOUT_SECS
            || self.force_shutdown_timeout_secs > MAX_FORCE_SHUTDOWN_TIMEOUT_SECS
        {
            return Err(ConfigError::harness(format!(
                "harness.force_shutdown_timeout_secs must be {}-{}, got {}",
                MIN_FORCE_SHUTDOWN_TIMEOUT_SECS,
                MAX_FORCE_SHUTDOWN_TIMEOUT_SECS,
                self.force_shutdown_timeout_secs
            )));
        }

        Ok(())
    }
}
