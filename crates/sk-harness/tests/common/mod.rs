//! Shared fixtures: in-process servers and `/bin/sh` clients.

use sk_config::{ClientConfig, StripeConfig, TriggerConfig};
use sk_harness::launch::{InlineContext, InlineExit, InlineLauncher, ServerLauncher};
use sk_harness::{CLIENTS_DIR_NAME, PhaseOrchestrator, StateInterlock, Stripe, UnitEnvironment};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tempfile::TempDir;

const BOOTSTRAP_LINE: &str = "INFO Server is listening on 9410";
const ACTIVE_LINE: &str = "INFO Terracotta Server instance has started up as ACTIVE node";
const PASSIVE_LINE: &str = "INFO Moved to State[ PASSIVE-STANDBY ]";

const POLL: Duration = Duration::from_millis(10);

/// First server up goes active; the rest stay passive until the active
/// they saw is gone.
fn cluster(
    interlock: Arc<StateInterlock>,
) -> impl Fn(&InlineContext) -> InlineExit + Send + Sync + 'static {
    let claimed = AtomicBool::new(false);
    move |ctx| {
        ctx.out(BOOTSTRAP_LINE);
        if claimed.swap(true, Ordering::SeqCst) {
            ctx.out(PASSIVE_LINE);
            let mut seen_active = false;
            loop {
                if ctx.wait_for_stop(POLL) {
                    return InlineExit::Exited(0);
                }
                match interlock.active_server() {
                    Ok(Some(_)) => seen_active = true,
                    Ok(None) if seen_active => break,
                    Ok(None) => {}
                    Err(_) => return InlineExit::Exited(0),
                }
            }
        }
        ctx.out(ACTIVE_LINE);
        while !ctx.wait_for_stop(Duration::from_secs(60)) {}
        InlineExit::Exited(0)
    }
}

/// Client running `script` under `/bin/sh`.
///
/// The script sees the launch arguments as positional parameters: `$2` is
/// the role (`SETUP`, `TEST`, `DESTROY`) and `${16}` the test client index.
pub fn sh_client(script: &str, test_client_count: u32) -> ClientConfig {
    ClientConfig {
        program: String::from("/bin/sh"),
        base_args: vec![String::from("-c"), script.to_string(), String::from("client")],
        entry_point: String::new(),
        heap_mb: 0,
        debug_port: 0,
        test_class: String::from("demo.ClusterTest"),
        error_class: None,
        test_client_count,
    }
}

pub struct TestRun {
    pub orchestrator: PhaseOrchestrator,
    pub dir: TempDir,
}

impl TestRun {
    pub fn new(server_count: u32, client: ClientConfig) -> Self {
        let dir = TempDir::new().unwrap();
        let triggers = TriggerConfig::default();
        let interlock = Arc::new(StateInterlock::new());
        let launcher: Arc<dyn ServerLauncher> = Arc::new(InlineLauncher::new(
            triggers.pid.clone(),
            cluster(Arc::clone(&interlock)),
        ));
        let env = Arc::new(UnitEnvironment::new(interlock, launcher, &triggers, false));

        let stripe_config = StripeConfig {
            server_count,
            ..StripeConfig::default()
        };
        let stripe = Stripe::install(&stripe_config, dir.path(), Arc::clone(&env)).unwrap();
        let orchestrator = PhaseOrchestrator::new(
            env,
            stripe,
            client,
            dir.path().join(CLIENTS_DIR_NAME),
            Duration::from_secs(30),
        );

        Self { orchestrator, dir }
    }
}
