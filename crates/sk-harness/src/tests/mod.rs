mod server_unit;
mod trigger_table;

use crate::launch::{InlineContext, InlineExit, InlineLauncher, ServerLauncher};
use crate::{ServerUnit, StateInterlock, Stripe, UnitEnvironment};

use sk_config::{StripeConfig, TriggerConfig};

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tempfile::TempDir;

pub(crate) const BOOTSTRAP_LINE: &str = "2024-01-01 INFO Server is listening on 9410";
pub(crate) const ACTIVE_LINE: &str =
    "2024-01-01 INFO Terracotta Server instance has started up as ACTIVE node on 0.0.0.0:9410";
pub(crate) const PASSIVE_LINE: &str = "2024-01-01 INFO Moved to State[ PASSIVE-STANDBY ]";
pub(crate) const ZAP_LINE: &str = "2024-01-01 WARN Restarting the server";

const POLL: Duration = Duration::from_millis(10);

/// Writer whose bytes stay readable after it has been handed off.
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub(crate) fn serve_until_stopped(ctx: &InlineContext) -> InlineExit {
    while !ctx.wait_for_stop(Duration::from_secs(60)) {}
    InlineExit::Exited(0)
}

/// Announces `lines` after the PID, then serves until killed.
pub(crate) fn serving(
    lines: &'static [&'static str],
) -> impl Fn(&InlineContext) -> InlineExit + Send + Sync + 'static {
    move |ctx| {
        for line in lines {
            ctx.out(line);
        }
        serve_until_stopped(ctx)
    }
}

/// Stand-in for leader election: the first server up goes active, the
/// others stay passive until the active they saw is gone.
pub(crate) fn cluster(
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
        serve_until_stopped(ctx)
    }
}

pub(crate) struct Fixture {
    pub interlock: Arc<StateInterlock>,
    pub env: Arc<UnitEnvironment>,
    pub dir: TempDir,
}

impl Fixture {
    pub(crate) fn with_launcher(
        interlock: Arc<StateInterlock>,
        launcher: Arc<dyn ServerLauncher>,
    ) -> Self {
        let env = Arc::new(UnitEnvironment::new(
            Arc::clone(&interlock),
            launcher,
            &TriggerConfig::default(),
            false,
        ));
        Self {
            interlock,
            env,
            dir: TempDir::new().unwrap(),
        }
    }

    pub(crate) fn inline<F>(body: F) -> Self
    where
        F: Fn(&InlineContext) -> InlineExit + Send + Sync + 'static,
    {
        let launcher = InlineLauncher::new(TriggerConfig::default().pid, body);
        Self::with_launcher(Arc::new(StateInterlock::new()), Arc::new(launcher))
    }

    /// Inline servers running [`cluster`] over this fixture's interlock.
    pub(crate) fn cluster() -> Self {
        let interlock = Arc::new(StateInterlock::new());
        let launcher = InlineLauncher::new(TriggerConfig::default().pid, cluster(Arc::clone(&interlock)));
        Self::with_launcher(interlock, Arc::new(launcher))
    }

    pub(crate) fn server(&self, name: &str) -> ServerUnit {
        let id = self.interlock.register_server(name).unwrap();
        ServerUnit::new(
            id,
            name.to_string(),
            id.index as u32,
            self.dir.path().join(name),
            Arc::clone(&self.env),
        )
    }

    pub(crate) fn stripe(&self, server_count: u32) -> Stripe {
        let config = StripeConfig {
            server_count,
            ..StripeConfig::default()
        };
        Stripe::install(&config, self.dir.path(), Arc::clone(&self.env)).unwrap()
    }
}

/// Poll `condition` for up to five seconds.
pub(crate) fn eventually<F: FnMut() -> bool>(mut condition: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(POLL);
    }
    condition()
}
