use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_GROUP_PORT_BASE, DEFAULT_SERVER_COUNT,
    DEFAULT_SERVER_HEAP_MB, DEFAULT_SERVER_NAME_PREFIX, DEFAULT_SERVER_PROGRAM,
    DEFAULT_STRIPE_NAME, DEFAULT_TSA_PORT_BASE, DEFAULT_URI_SCHEME,
};

use std::collections::BTreeMap;

use serde::Deserialize;

pub const MIN_SERVER_COUNT: u32 = 1;
pub const MAX_SERVER_COUNT: u32 = 16;

/// Characters reserved by the cluster info encoding.
const RESERVED_NAME_CHARS: [char; 2] = [',', ';'];

/// One stripe of servers and the command used to launch each of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StripeConfig {
    pub name: String,
    pub server_count: u32,
    /// Server `i` is named `<prefix><i>`
    pub server_name_prefix: String,
    pub program: String,
    /// Entry point and arguments placed after the heap/debug/property flags
    pub entry_args: Vec<String>,
    /// Min/max heap in MiB; 0 leaves the heap flags off
    pub heap_mb: u32,
    /// Server `i` listens for a debugger on base+i; 0 disables debugging
    pub debug_base_port: u16,
    pub tsa_port_base: u16,
    pub group_port_base: u16,
    /// Stripe config reference passed as `-f`
    pub config_file: Option<String>,
    /// Rendered as `-Dkey=value`
    pub properties: BTreeMap<String, String>,
    pub uri_scheme: String,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            name: String::from(DEFAULT_STRIPE_NAME),
            server_count: DEFAULT_SERVER_COUNT,
            server_name_prefix: String::from(DEFAULT_SERVER_NAME_PREFIX),
            program: String::from(DEFAULT_SERVER_PROGRAM),
            entry_args: vec![
                String::from("-cp"),
                String::from("server/lib/*"),
                String::from("com.tc.server.TCServerMain"),
            ],
            heap_mb: DEFAULT_SERVER_HEAP_MB,
            debug_base_port: 0,
            tsa_port_base: DEFAULT_TSA_PORT_BASE,
            group_port_base: DEFAULT_GROUP_PORT_BASE,
            config_file: None,
            properties: BTreeMap::new(),
            uri_scheme: String::from(DEFAULT_URI_SCHEME),
        }
    }
}

impl StripeConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::stripe("stripe.name must not be empty"));
        }

        if self.server_count < MIN_SERVER_COUNT || self.server_count > MAX_SERVER_COUNT {
            return Err(ConfigError::stripe(format!(
                "stripe.server_count must be {}-{}, got {}",
                MIN_SERVER_COUNT, MAX_SERVER_COUNT, self.server_count
            )));
        }

        if self.server_name_prefix.is_empty()
            || self.server_name_prefix.contains(RESERVED_NAME_CHARS)
        {
            return Err(ConfigError::stripe(format!(
                "stripe.server_name_prefix must be non-empty without ',' or ';', got \"{}\"",
                self.server_name_prefix
            )));
        }

        if self.program.trim().is_empty() {
            return Err(ConfigError::stripe("stripe.program must not be empty"));
        }

        if self.uri_scheme.trim().is_empty() {
            return Err(ConfigError::stripe("stripe.uri_scheme must not be empty"));
        }

        self.validate_port_range("tsa_port_base", self.tsa_port_base)?;
        self.validate_port_range("group_port_base", self.group_port_base)?;
        if self.debug_base_port != 0 {
            self.validate_port_range("debug_base_port", self.debug_base_port)?;
        }

        Ok(())
    }

    fn validate_port_range(&self, field: &str, base: u16) -> ConfigErrorResult<()> {
        if base == 0 {
            return Err(ConfigError::stripe(format!("stripe.{field} must not be 0")));
        }

        let last = u32::from(base) + self.server_count.saturating_sub(1);
        if last > u32::from(u16::MAX) {
            return Err(ConfigError::stripe(format!(
                "stripe.{field} {} leaves no room for {} servers",
                base, self.server_count
            )));
        }

        Ok(())
    }

    pub fn server_name(&self, index: u32) -> String {
        format!("{}{}", self.server_name_prefix, index)
    }

    /// Callers stay below `server_count`, which `validate` keeps in range.
    pub fn tsa_port(&self, index: u32) -> u16 {
        offset_port(self.tsa_port_base, index)
    }

    pub fn group_port(&self, index: u32) -> u16 {
        offset_port(self.group_port_base, index)
    }

    pub fn debug_port(&self, index: u32) -> Option<u16> {
        (self.debug_base_port != 0).then(|| offset_port(self.debug_base_port, index))
    }
}

fn offset_port(base: u16, index: u32) -> u16 {
    u16::try_from(u32::from(base) + index).unwrap_or(u16::MAX)
}
