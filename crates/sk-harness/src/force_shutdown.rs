use crate::{ClientUnit, HarnessError, HarnessResult, StateInterlock, StripeControl};

use std::time::{Duration, Instant};

use log::{error, info, warn};

/// Longest single wait for the interlock to empty before sweeping again.
const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Bounded end-of-run sweep: kill every registered client, stop every
/// running server, and wait for the interlock to empty.
///
/// Running past the budget means something is stuck outside the system
/// under test, so it is an error rather than a test failure.
pub struct ForceShutdown<'a> {
    interlock: &'a StateInterlock,
    timeout: Duration,
}

impl<'a> ForceShutdown<'a> {
    pub fn new(interlock: &'a StateInterlock, timeout: Duration) -> Self {
        Self { interlock, timeout }
    }

    pub fn run(&self, clients: &[ClientUnit], stripe: &StripeControl) -> HarnessResult<()> {
        self.interlock.begin_shutdown();
        let deadline = Instant::now() + self.timeout;

        loop {
            self.sweep(clients, stripe, deadline);

            let remaining = deadline.saturating_duration_since(Instant::now());
            if self.interlock.wait_for_empty(remaining.min(SWEEP_INTERVAL)) {
                info!("< force_shutdown");
                return Ok(());
            }
            if Instant::now() >= deadline {
                let state = self.interlock.dump();
                error!("Forced shutdown timed out after {:?}\n{state}", self.timeout);
                return Err(HarnessError::force_shutdown_timeout(
                    self.timeout.as_secs(),
                    state,
                ));
            }
            info!("force_shutdown waiting: {}", self.interlock.summary());
        }
    }

    fn sweep(&self, clients: &[ClientUnit], stripe: &StripeControl, deadline: Instant) {
        let registered = self.interlock.running_clients();
        for client in clients.iter().filter(|c| registered.contains(&c.id())) {
            match client.force_terminate_within(deadline) {
                Ok(true) => {}
                Ok(false) => warn!("{} was not assigned a process in time", client.name()),
                Err(e) => warn!("Could not terminate {}: {e}", client.name()),
            }
        }

        let running = self.interlock.running_servers();
        for server in stripe.units().iter().filter(|s| running.contains(&s.id())) {
            match server.stop_within(deadline) {
                Ok(true) => {}
                Ok(false) => warn!("{} did not stop in time", server.name()),
                Err(e) => warn!("Could not stop {}: {e}", server.name()),
            }
        }
    }
}
