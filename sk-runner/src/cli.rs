use sk_config::{Config, LogLevel};

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Command-line overrides; anything left unset keeps its configured value.
#[derive(Parser, Debug)]
#[command(name = "stripekit")]
#[command(about = "Run a client test against a stripe of servers")]
#[command(version)]
pub struct Cli {
    /// Config file (default: config.toml in SK_CONFIG_DIR or ./.stripekit)
    #[arg(long, short = 'c')]
    pub(crate) config: Option<PathBuf>,

    /// Root directory for run directories
    #[arg(long)]
    pub(crate) run_dir: Option<String>,

    /// Number of servers in the stripe
    #[arg(long)]
    pub(crate) servers: Option<u32>,

    /// Number of concurrent test clients
    #[arg(long)]
    pub(crate) clients: Option<u32>,

    /// Test entry point handed to every client
    #[arg(long)]
    pub(crate) test_class: Option<String>,

    /// Fail the run on warning/error lines in unit output
    #[arg(long)]
    pub(crate) fail_on_log_severity: bool,

    /// Budget for the final forced shutdown, e.g. "90s" or "2m"
    #[arg(long, value_parser = humantime::parse_duration)]
    pub(crate) force_shutdown_timeout: Option<Duration>,

    #[arg(long)]
    pub(crate) log_level: Option<LogLevel>,

    /// Plain log output even on a terminal
    #[arg(long)]
    pub(crate) no_color: bool,
}

impl Cli {
    pub(crate) fn apply(&self, config: &mut Config) {
        if let Some(run_dir) = &self.run_dir {
            config.harness.run_dir = run_dir.clone();
        }
        if let Some(servers) = self.servers {
            config.stripe.server_count = servers;
        }
        if let Some(clients) = self.clients {
            config.client.test_client_count = clients;
        }
        if let Some(test_class) = &self.test_class {
            config.client.test_class = test_class.clone();
        }
        if self.fail_on_log_severity {
            config.harness.fail_on_log_severity = true;
        }
        if let Some(timeout) = self.force_shutdown_timeout {
            config.harness.force_shutdown_timeout_secs = timeout.as_secs();
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if self.no_color {
            config.logging.colored = false;
        }
    }
}
