//! stripekit - drives one client test against a stripe of servers
//!
//! ```bash
//! # Run with ./.stripekit/config.toml and three servers
//! stripekit --servers 3 --test-class com.example.FailoverTest
//!
//! # Explicit config, debug logging
//! stripekit -c ci/stripe.toml --log-level debug --no-color
//! ```
//!
//! Exit status: 0 when the test passed, 1 when it failed, 2 when the
//! harness itself could not complete the run.

mod cli;
mod error;
mod logger;
mod run_dir;
mod signals;


use crate::cli::Cli;
use crate::error::Result as RunnerResult;
use crate::signals::SignalWatch;

use sk_config::Config;
use sk_harness::launch::{ExternalLauncher, ServerLauncher};
use sk_harness::{
    CLIENTS_DIR_NAME, PhaseOrchestrator, REPORT_FILE_NAME, RunReport, StateInterlock, Stripe,
    UnitEnvironment, Verdict,
};

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use clap::Parser;
use log::{error, info, warn};

const EXIT_TEST_FAILED: u8 = 1;
const EXIT_HARNESS_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(verdict) if verdict.is_passed() => {
            info!("PASSED");
            ExitCode::SUCCESS
        }
        Ok(verdict) => {
            error!("{verdict}");
            ExitCode::from(EXIT_TEST_FAILED)
        }
        Err(e) => {
            // the logger may not be up yet
            eprintln!("stripekit: {e}");
            error!("{e}");
            ExitCode::from(EXIT_HARNESS_ERROR)
        }
    }
}

fn load_config(cli: &Cli) -> RunnerResult<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli) -> RunnerResult<Verdict> {
    let config = load_config(cli)?;

    let started_local = Local::now();
    let run_dir = run_dir::create(Path::new(&config.harness.run_dir), started_local)?;

    let log_file: Option<PathBuf> = config.logging.file.as_ref().map(|name| run_dir.join(name));
    logger::initialize(config.logging.level, log_file, config.logging.colored)?;

    info!("Starting stripekit v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();
    info!("Run directory: {}", run_dir.display());

    let interlock = Arc::new(StateInterlock::new());
    let signals = SignalWatch::start(Arc::clone(&interlock))?;

    let launcher: Arc<dyn ServerLauncher> = Arc::new(ExternalLauncher::new(config.stripe.clone()));
    let env = Arc::new(UnitEnvironment::new(
        Arc::clone(&interlock),
        launcher,
        &config.triggers,
        config.harness.fail_on_log_severity,
    ));

    let stripe = match Stripe::install(&config.stripe, &run_dir, Arc::clone(&env)) {
        Ok(stripe) => stripe,
        Err(e) => {
            signals.close();
            return Err(e.into());
        }
    };
    info!(
        "Installed {} ({} servers) at {}",
        stripe.name(),
        stripe.server_count(),
        stripe.connect_uri()
    );

    let orchestrator = PhaseOrchestrator::new(
        env,
        stripe,
        config.client.clone(),
        run_dir.join(CLIENTS_DIR_NAME),
        Duration::from_secs(config.harness.force_shutdown_timeout_secs),
    );
    let outcome = orchestrator.run();
    signals.close();

    let report = RunReport::collect(
        &run_dir,
        started_local.with_timezone(&Utc),
        &interlock,
        &orchestrator.clients(),
        outcome.as_ref().err().map(ToString::to_string),
    );
    let report_path = run_dir.join(REPORT_FILE_NAME);
    match report.write(&report_path) {
        Ok(()) => info!("Report written to {}", report_path.display()),
        Err(e) => warn!("Could not write {}: {e}", report_path.display()),
    }

    outcome.map_err(Into::into)
}
