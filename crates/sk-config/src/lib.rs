mod client_config;
mod config;
mod error;
mod harness_config;
mod log_level;
mod logging_config;
mod stripe_config;
mod trigger_config;

pub use client_config::ClientConfig;
pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use harness_config::HarnessConfig;
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use stripe_config::StripeConfig;
pub use trigger_config::TriggerConfig;

/// Environment variable naming the configuration directory.
pub const CONFIG_DIR_ENV: &str = "SK_CONFIG_DIR";
/// Directory used when `SK_CONFIG_DIR` is not set, relative to the working directory.
pub const DEFAULT_CONFIG_DIR_NAME: &str = ".stripekit";
pub const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_RUN_DIR: &str = "runs";
const DEFAULT_FAIL_ON_LOG_SEVERITY: bool = false;
const DEFAULT_FORCE_SHUTDOWN_TIMEOUT_SECS: u64 = 120;

const DEFAULT_STRIPE_NAME: &str = "stripe1";
const DEFAULT_SERVER_COUNT: u32 = 1;
const DEFAULT_SERVER_NAME_PREFIX: &str = "testServer";
const DEFAULT_SERVER_PROGRAM: &str = "java";
const DEFAULT_SERVER_HEAP_MB: u32 = 256;
const DEFAULT_TSA_PORT_BASE: u16 = 9410;
const DEFAULT_GROUP_PORT_BASE: u16 = 9430;
const DEFAULT_URI_SCHEME: &str = "terracotta";

const DEFAULT_CLIENT_PROGRAM: &str = "java";
const DEFAULT_CLIENT_ENTRY_POINT: &str = "org.terracotta.testing.client.TestClientStub";
const DEFAULT_CLIENT_HEAP_MB: u32 = 64;
const DEFAULT_TEST_CLIENT_COUNT: u32 = 1;

const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_COLORED: bool = true;

#[cfg(test)]
mod tests;
