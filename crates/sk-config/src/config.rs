use crate::{
    CONFIG_DIR_ENV, CONFIG_FILE_NAME, ClientConfig, ConfigError, ConfigErrorResult,
    DEFAULT_CONFIG_DIR_NAME, HarnessConfig, LoggingConfig, StripeConfig, TriggerConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub harness: HarnessConfig,
    pub stripe: StripeConfig,
    pub client: ClientConfig,
    pub triggers: TriggerConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config from the config directory.
    ///
    /// Loading order:
    /// 1. Check for SK_CONFIG_DIR env var, else use ./.stripekit/
    /// 2. Load config.toml if it exists, else use defaults
    /// 3. Apply SK_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_path = Self::config_dir()?.join(CONFIG_FILE_NAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load an explicit config file, then apply SK_* overrides.
    pub fn load_from(path: &Path) -> ConfigErrorResult<Self> {
        let mut config = Self::load_toml(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: SK_CONFIG_DIR env var > ./.stripekit/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR_NAME))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.harness.validate()?;
        self.stripe.validate()?;
        self.client.validate()?;
        self.triggers.validate()?;

        Ok(())
    }

    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  harness: run_dir={}, fail_on_log_severity={}, force_shutdown={}s",
            self.harness.run_dir,
            self.harness.fail_on_log_severity,
            self.harness.force_shutdown_timeout_secs
        );
        info!(
            "  stripe: {} x{} ({}N), program={}, tsa={}+, group={}+",
            self.stripe.name,
            self.stripe.server_count,
            self.stripe.server_name_prefix,
            self.stripe.program,
            self.stripe.tsa_port_base,
            self.stripe.group_port_base
        );
        if self.stripe.debug_base_port != 0 {
            info!("  stripe: debug ports from {}", self.stripe.debug_base_port);
        }
        info!(
            "  client: program={}, entry={}, test_class={}, test_clients={}",
            self.client.program,
            self.client.entry_point,
            self.client.test_class,
            self.client.test_client_count
        );
        info!(
            "  logging: {} (colored: {})",
            *self.logging.level, self.logging.colored
        );
    }

    fn apply_env_overrides(&mut self) {
        // Harness
        Self::apply_env_string("SK_RUN_DIR", &mut self.harness.run_dir);
        Self::apply_env_bool(
            "SK_FAIL_ON_LOG_SEVERITY",
            &mut self.harness.fail_on_log_severity,
        );
        Self::apply_env_parse(
            "SK_FORCE_SHUTDOWN_TIMEOUT_SECS",
            &mut self.harness.force_shutdown_timeout_secs,
        );

        // Stripe
        Self::apply_env_string("SK_STRIPE_NAME", &mut self.stripe.name);
        Self::apply_env_parse("SK_SERVER_COUNT", &mut self.stripe.server_count);
        Self::apply_env_string("SK_SERVER_PROGRAM", &mut self.stripe.program);
        Self::apply_env_parse("SK_SERVER_HEAP_MB", &mut self.stripe.heap_mb);
        Self::apply_env_parse("SK_SERVER_DEBUG_BASE_PORT", &mut self.stripe.debug_base_port);
        Self::apply_env_parse("SK_TSA_PORT_BASE", &mut self.stripe.tsa_port_base);
        Self::apply_env_parse("SK_GROUP_PORT_BASE", &mut self.stripe.group_port_base);
        Self::apply_env_option_string("SK_STRIPE_CONFIG_FILE", &mut self.stripe.config_file);

        // Client
        Self::apply_env_string("SK_CLIENT_PROGRAM", &mut self.client.program);
        Self::apply_env_parse("SK_CLIENT_HEAP_MB", &mut self.client.heap_mb);
        Self::apply_env_parse("SK_CLIENT_DEBUG_PORT", &mut self.client.debug_port);
        Self::apply_env_string("SK_TEST_CLASS", &mut self.client.test_class);
        Self::apply_env_option_string("SK_ERROR_CLASS", &mut self.client.error_class);
        Self::apply_env_parse(
            "SK_TEST_CLIENT_COUNT",
            &mut self.client.test_client_count,
        );

        // Logging
        Self::apply_env_parse("SK_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("SK_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("SK_LOG_FILE", &mut self.logging.file);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}
