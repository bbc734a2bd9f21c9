//! Sequencing of a whole run.
//!
//! Servers come up first; then the setup client, the test clients
//! concurrently, and the destroy client. Every failure lands in the
//! interlock verdict. Whatever happened, a forced shutdown closes the run.

use crate::launch::ProcessCommand;
use crate::{
    ClientExitListener, ClientId, ClientUnit, ClusterControl, FailureCause, ForceShutdown,
    HarnessResult, StateInterlock, Stripe, UnitEnvironment, Verdict,
};

use sk_config::ClientConfig;
use sk_core::{ClientArgs, ClientRole};

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{error, info, warn};

/// Number of stripes a harness run drives.
const STRIPE_COUNT: u32 = 1;

/// Fails the run on any test client that does not exit with 0.
struct TestClientListener {
    interlock: Arc<StateInterlock>,
}

impl ClientExitListener for TestClientListener {
    fn on_client_exit(&self, client: &ClientId, exit_code: Option<i32>) {
        if exit_code != Some(0) {
            self.interlock.test_did_fail(FailureCause::TestClient {
                client: client.name(),
                exit_code,
            });
        }
    }
}

pub struct PhaseOrchestrator {
    env: Arc<UnitEnvironment>,
    stripe: Stripe,
    client: ClientConfig,
    clients_dir: PathBuf,
    force_shutdown_timeout: Duration,
    clients: Mutex<Vec<ClientUnit>>,
}

impl PhaseOrchestrator {
    pub fn new(
        env: Arc<UnitEnvironment>,
        stripe: Stripe,
        client: ClientConfig,
        clients_dir: PathBuf,
        force_shutdown_timeout: Duration,
    ) -> Self {
        Self {
            env,
            stripe,
            client,
            clients_dir,
            force_shutdown_timeout,
            clients: Mutex::new(Vec::new()),
        }
    }

    pub fn interlock(&self) -> &Arc<StateInterlock> {
        &self.env.interlock
    }

    pub fn stripe(&self) -> &Stripe {
        &self.stripe
    }

    /// Every client installed so far, in installation order.
    pub fn clients(&self) -> Vec<ClientUnit> {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run all phases and the forced shutdown.
    ///
    /// A test failure is part of the returned verdict. A harness malfunction
    /// also fails the verdict, and is returned as the error once the
    /// shutdown has completed.
    pub fn run(&self) -> HarnessResult<Verdict> {
        let interlock = &self.env.interlock;

        let outcome = self.run_phases();
        if let Err(e) = &outcome {
            error!("Harness error: {e}");
            interlock.test_did_fail(FailureCause::harness(e.to_string()));
        }
        interlock.set_test_did_pass_if_not_failed();
        info!("Verdict before shutdown: {}", interlock.verdict());

        let control = self.stripe.control();
        ForceShutdown::new(interlock, self.force_shutdown_timeout)
            .run(&self.clients(), &control)?;

        outcome?;
        let verdict = interlock.verdict();
        info!("Verdict: {verdict}");
        Ok(verdict)
    }

    fn run_phases(&self) -> HarnessResult<()> {
        if let Err(e) = self.stripe.control().start_all_and_wait_ready() {
            // a failed wait only repeats what the verdict already says
            if e.is_test_failure() {
                warn!("Servers did not come up: {e}");
                return Ok(());
            }
            return Err(e);
        }

        if !self.run_setup() {
            return Ok(());
        }
        self.run_tests();
        self.run_destroy();
        Ok(())
    }

    /// `true` if the setup client exited cleanly.
    fn run_setup(&self) -> bool {
        let id = ClientId::setup();
        let exit_code = match self.start_client(id, None) {
            Ok(unit) => {
                self.await_clients(std::slice::from_ref(&unit));
                unit.wait_for_exit()
            }
            Err(e) => {
                error!("Could not run {id}: {e}");
                None
            }
        };

        if exit_code == Some(0) {
            return true;
        }
        self.env
            .interlock
            .test_did_fail(FailureCause::SetupClient { exit_code });
        false
    }

    fn run_tests(&self) {
        let listener: Arc<dyn ClientExitListener> = Arc::new(TestClientListener {
            interlock: Arc::clone(&self.env.interlock),
        });

        let mut units = Vec::new();
        for index in 0..self.client.test_client_count {
            let id = ClientId::test(index);
            match self.start_client(id, Some(Arc::clone(&listener))) {
                Ok(unit) => units.push(unit),
                Err(e) => {
                    // nothing further is installed once one client could not be
                    error!("Could not install {id}: {e}");
                    self.env
                        .interlock
                        .test_did_fail(FailureCause::harness(format!("{id} not started: {e}")));
                    break;
                }
            }
        }

        self.await_clients(&units);
    }

    fn run_destroy(&self) {
        let id = ClientId::destroy();
        let exit_code = match self.start_client(id, None) {
            Ok(unit) => unit.wait_for_exit(),
            Err(e) => {
                error!("Could not run {id}: {e}");
                None
            }
        };

        if exit_code != Some(0) {
            self.env
                .interlock
                .test_did_fail(FailureCause::DestroyClient { exit_code });
        }
    }

    /// Wait for `units` to finish; once the run has failed, kill whichever are left.
    fn await_clients(&self, units: &[ClientUnit]) {
        if let Err(e) = self.env.interlock.wait_for_client_termination() {
            warn!("Terminating remaining clients: {e}");
            for unit in units {
                if let Err(e) = unit.force_terminate() {
                    error!("Could not terminate {}: {e}", unit.name());
                }
            }
        }
        for unit in units {
            unit.wait_for_exit();
        }
    }

    /// Install, register and start one client.
    fn start_client(
        &self,
        id: ClientId,
        listener: Option<Arc<dyn ClientExitListener>>,
    ) -> HarnessResult<ClientUnit> {
        let args = self.client_args(id);
        let control: Arc<dyn ClusterControl> = self.stripe.control();
        let unit = ClientUnit::new(
            id,
            ProcessCommand::for_client(&self.client, &args),
            self.clients_dir.join(id.name()),
            Arc::clone(&self.env),
            control,
        );

        self.env.interlock.register_running_client(id)?;
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(unit.clone());
        unit.start(listener)?;
        Ok(unit)
    }

    fn client_args(&self, id: ClientId) -> ClientArgs {
        ClientArgs {
            task: id.role,
            test_class: self.client.test_class.clone(),
            connect_uri: self.stripe.connect_uri().to_string(),
            cluster_info: self.stripe.cluster_info().clone(),
            number_of_stripes: STRIPE_COUNT,
            number_of_servers_per_stripe: self.stripe.server_count() as u32,
            total_client_count: self.client.test_client_count,
            this_client_index: match id.role {
                ClientRole::Test => id.index,
                _ => 0,
            },
            error_class: self.client.error_class.clone(),
        }
    }
}
