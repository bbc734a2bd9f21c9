use crate::error::Result as RunnerResult;

use sk_harness::StateInterlock;

use std::sync::Arc;
use std::thread::JoinHandle;

use log::warn;

/// Turns SIGINT/SIGTERM into a failed verdict so every wait unblocks and
/// the run goes straight to forced shutdown.
pub struct SignalWatch {
    #[cfg(unix)]
    handle: signal_hook::iterator::Handle,
    thread: Option<JoinHandle<()>>,
}

impl SignalWatch {
    #[cfg(unix)]
    pub fn start(interlock: Arc<StateInterlock>) -> RunnerResult<Self> {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        use sk_harness::FailureCause;

        use log::info;

        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        let handle = signals.handle();
        let thread = std::thread::Builder::new()
            .name(String::from("signals"))
            .spawn(move || {
                for signal in signals.forever() {
                    if interlock.verdict().is_failed() {
                        info!("Received signal {signal}, shutdown already under way");
                        continue;
                    }
                    warn!("Received signal {signal}, failing the run");
                    interlock.test_did_fail(FailureCause::Interrupted { signal });
                }
            })?;

        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }

    #[cfg(not(unix))]
    pub fn start(_interlock: Arc<StateInterlock>) -> RunnerResult<Self> {
        warn!("Signal handling is only available on Unix");
        Ok(Self { thread: None })
    }

    pub fn close(mut self) {
        #[cfg(unix)]
        self.handle.close();

        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!("Signal thread panicked");
        }
    }
}
