use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_CLIENT_ENTRY_POINT, DEFAULT_CLIENT_HEAP_MB,
    DEFAULT_CLIENT_PROGRAM, DEFAULT_TEST_CLIENT_COUNT,
};

use serde::Deserialize;

pub const MIN_TEST_CLIENT_COUNT: u32 = 1;
pub const MAX_TEST_CLIENT_COUNT: u32 = 64;

/// Command template shared by the setup, test and destroy clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub program: String,
    /// Arguments placed before the entry point (classpath and the like)
    pub base_args: Vec<String>,
    pub entry_point: String,
    /// Min/max heap in MiB; 0 leaves the heap flags off
    pub heap_mb: u32,
    /// Debugger port for the test clients; 0 disables debugging
    pub debug_port: u16,
    pub test_class: String,
    pub error_class: Option<String>,
    pub test_client_count: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            program: String::from(DEFAULT_CLIENT_PROGRAM),
            base_args: vec![String::from("-cp"), String::from("client/lib/*")],
            entry_point: String::from(DEFAULT_CLIENT_ENTRY_POINT),
            heap_mb: DEFAULT_CLIENT_HEAP_MB,
            debug_port: 0,
            test_class: String::new(),
            error_class: None,
            test_client_count: DEFAULT_TEST_CLIENT_COUNT,
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.program.trim().is_empty() {
            return Err(ConfigError::client("client.program must not be empty"));
        }

        if self.test_client_count < MIN_TEST_CLIENT_COUNT
            || self.test_client_count > MAX_TEST_CLIENT_COUNT
        {
            return Err(ConfigError::client(format!(
                "client.test_client_count must be {}-{}, got {}",
                MIN_TEST_CLIENT_COUNT, MAX_TEST_CLIENT_COUNT, self.test_client_count
            )));
        }

        Ok(())
    }

    pub fn debug_port(&self) -> Option<u16> {
        (self.debug_port != 0).then_some(self.debug_port)
    }
}
