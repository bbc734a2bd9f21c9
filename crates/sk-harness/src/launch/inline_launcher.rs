use crate::launch::{
    ExitOutcome, ExitWait, InlineContext, LaunchContext, LaunchedServer, ServerLauncher,
    StopSignal,
};
use crate::HarnessResult;

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use log::{debug, error};

/// How a run of an in-process server body ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineExit {
    Exited(i32),
    /// Relaunch the body on the same unit without terminating it.
    Restart,
}

pub type InlineBody = dyn Fn(&InlineContext) -> InlineExit + Send + Sync;

type StopRegistry = Arc<Mutex<HashMap<u32, Arc<StopSignal>>>>;

fn registry(stops: &StopRegistry) -> MutexGuard<'_, HashMap<u32, Arc<StopSignal>>> {
    stops.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs each server as a body on a thread of this process.
///
/// Every launch gets a fresh synthetic PID, announced with the PID trigger
/// phrase before the body runs; killing that PID raises the body's stop
/// signal. Bodies may end with [`InlineExit::Restart`], so units are not
/// one-shot.
pub struct InlineLauncher {
    pid_phrase: String,
    body: Arc<InlineBody>,
    next_pid: AtomicU32,
    stops: StopRegistry,
}

impl InlineLauncher {
    const FIRST_PID: u32 = 1000;

    pub fn new<F>(pid_phrase: String, body: F) -> Self
    where
        F: Fn(&InlineContext) -> InlineExit + Send + Sync + 'static,
    {
        Self {
            pid_phrase,
            body: Arc::new(body),
            next_pid: AtomicU32::new(Self::FIRST_PID),
            stops: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl ServerLauncher for InlineLauncher {
    fn launch(&self, ctx: &LaunchContext) -> HarnessResult<LaunchedServer> {
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        let (stdout_reader, stdout_writer) = std::io::pipe()?;
        let (stderr_reader, stderr_writer) = std::io::pipe()?;

        let stop = Arc::new(StopSignal::new());
        registry(&self.stops).insert(pid, Arc::clone(&stop));

        let body = Arc::clone(&self.body);
        let announcement = format!("{} {pid}", self.pid_phrase);
        let (name, index) = (ctx.name.clone(), ctx.index);

        let stop_on_exit = Arc::clone(&stop);
        let spawned = thread::Builder::new()
            .name(format!("inline-{name}"))
            .spawn(move || {
                let context = InlineContext::new(name, index, pid, stdout_writer, stderr_writer, stop);
                context.out(&announcement);
                panic::catch_unwind(AssertUnwindSafe(|| body(&context)))
                    .map_err(|_| ())
            });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                registry(&self.stops).remove(&pid);
                return Err(e.into());
            }
        };
        debug!("{} running inline with PID {pid}", ctx.name);

        Ok(LaunchedServer {
            stdout: Box::new(stdout_reader),
            stderr: Box::new(stderr_reader),
            exit: Box::new(InlineExitWait {
                pid,
                handle,
                stop: stop_on_exit,
                stops: Arc::clone(&self.stops),
            }),
        })
    }

    fn kill(&self, pid: u32) -> HarnessResult<()> {
        if let Some(stop) = registry(&self.stops).get(&pid) {
            stop.raise();
        }
        Ok(())
    }

    fn is_one_shot(&self) -> bool {
        false
    }
}

struct InlineExitWait {
    pid: u32,
    handle: JoinHandle<Result<InlineExit, ()>>,
    stop: Arc<StopSignal>,
    stops: StopRegistry,
}

impl ExitWait for InlineExitWait {
    fn wait(self: Box<Self>) -> ExitOutcome {
        let Self {
            pid,
            handle,
            stop,
            stops,
        } = *self;
        let outcome = match handle.join() {
            Ok(Ok(InlineExit::Exited(code))) => ExitOutcome::Exited {
                status: format!("exit code {code}"),
            },
            // a kill aimed at this run must not be outlived by a relaunch
            Ok(Ok(InlineExit::Restart)) if stop.is_raised() => ExitOutcome::Exited {
                status: String::from("stopped while restarting"),
            },
            Ok(Ok(InlineExit::Restart)) => ExitOutcome::RestartInPlace,
            Ok(Err(())) | Err(_) => {
                error!("Inline server with PID {pid} panicked");
                ExitOutcome::Exited {
                    status: String::from("panicked"),
                }
            }
        };
        registry(&stops).remove(&pid);
        outcome
    }
}
