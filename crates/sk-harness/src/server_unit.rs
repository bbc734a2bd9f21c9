//! One server of the stripe.
//!
//! The unit drives the interlock's state machine for its slot: `start`
//! moves it to `Startup` and hands the process to a watcher thread, the
//! trigger scanner moves it through its roles, and the watcher reports the
//! termination once the output has been drained and the log files closed.

use crate::launch::{ExitOutcome, LaunchContext, LaunchedServer};
use crate::{
    AdmissionGate, FailureCause, HarnessError, HarnessResult, ServerId, ServerTriggerHandler,
    SeverityHandler, TriggerScanner, UnitEnvironment, UnitLogs,
};

use sk_core::ServerMode;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{error, info, warn};

#[derive(Clone)]
pub struct ServerUnit {
    inner: Arc<ServerUnitInner>,
}

struct ServerUnitInner {
    id: ServerId,
    name: String,
    index: u32,
    working_dir: PathBuf,
    env: Arc<UnitEnvironment>,
    gate: AdmissionGate,
    started: AtomicBool,
    /// Set by `stop`; an in-place restart seen after it ends the run instead.
    stop_requested: AtomicBool,
}

impl ServerUnit {
    pub fn new(
        id: ServerId,
        name: String,
        index: u32,
        working_dir: PathBuf,
        env: Arc<UnitEnvironment>,
    ) -> Self {
        Self {
            inner: Arc::new(ServerUnitInner {
                id,
                gate: AdmissionGate::new(name.clone()),
                name,
                index,
                working_dir,
                env,
                started: AtomicBool::new(false),
                stop_requested: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> ServerId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn working_dir(&self) -> &PathBuf {
        &self.inner.working_dir
    }

    /// Launch the server and return without waiting for it to come up.
    ///
    /// Starting a unit that is still running is a harness bug and fails the run.
    pub fn start(&self) -> HarnessResult<()> {
        self.inner.gate.with_admission(|| self.start_admitted())
    }

    fn start_admitted(&self) -> HarnessResult<()> {
        let inner = &self.inner;
        let interlock = &inner.env.interlock;

        if interlock.is_server_running(inner.id)? {
            interlock.test_did_fail(FailureCause::harness(format!(
                "{} started while already running",
                inner.name
            )));
            return Err(HarnessError::already_running(inner.name.clone()));
        }
        if inner.env.launcher.is_one_shot() && inner.started.swap(true, Ordering::SeqCst) {
            return Err(HarnessError::one_shot_reused(inner.name.clone()));
        }

        let logs = UnitLogs::open(&inner.working_dir)?;
        interlock.server_did_start(inner.id)?;
        inner.stop_requested.store(false, Ordering::SeqCst);

        let launched = match inner.env.launcher.launch(&inner.launch_context()) {
            Ok(launched) => launched,
            Err(e) => {
                interlock.server_did_terminate(inner.id, &format!("launch failed: {e}"))?;
                return Err(e);
            }
        };

        let watcher = Arc::clone(inner);
        let spawned = thread::Builder::new()
            .name(format!("watch-{}", inner.name))
            .spawn(move || watcher.watch(logs, launched));
        if let Err(e) = spawned {
            interlock.server_did_terminate(inner.id, &format!("watcher not started: {e}"))?;
            return Err(e.into());
        }
        Ok(())
    }

    /// Kill the server and wait until it has terminated. No-op if not running.
    pub fn stop(&self) -> HarnessResult<()> {
        self.inner
            .gate
            .with_admission(|| self.stop_admitted(None))
            .map(drop)
    }

    /// Bounded `stop`: `Ok(false)` if the server was still running at `deadline`.
    pub fn stop_within(&self, deadline: Instant) -> HarnessResult<bool> {
        Ok(self
            .inner
            .gate
            .with_admission_within(deadline, || self.stop_admitted(Some(deadline)))?
            .unwrap_or(false))
    }

    fn stop_admitted(&self, deadline: Option<Instant>) -> HarnessResult<bool> {
        let inner = &self.inner;
        let interlock = &inner.env.interlock;

        if !interlock.is_server_running(inner.id)? {
            return Ok(true);
        }
        interlock.set_crash_expected(inner.id, true)?;
        inner.stop_requested.store(true, Ordering::SeqCst);

        // A server cannot be killed before it has told us who it is.
        match interlock.wait_for_pid(inner.id, deadline)? {
            Some(pid) => {
                info!("Stopping {} (PID {pid})", inner.name);
                inner.env.launcher.kill(pid)?;
            }
            None => return Ok(!interlock.is_server_running(inner.id)?),
        }

        let mode = interlock.wait_for_server_termination(inner.id, deadline)?;
        Ok(mode == ServerMode::Terminated)
    }

    pub fn wait_for_running(&self) -> HarnessResult<ServerMode> {
        self.inner.env.interlock.wait_for_server_running(self.inner.id)
    }

    pub fn wait_for_ready(&self) -> HarnessResult<ServerMode> {
        self.inner.env.interlock.wait_for_server_ready(self.inner.id)
    }

    /// Returns the mode at return: `Terminated`, unless `timeout` ran out first.
    pub fn wait_for_termination(&self, timeout: Option<Duration>) -> HarnessResult<ServerMode> {
        let deadline = timeout.map(|t| Instant::now() + t);
        self.inner
            .env
            .interlock
            .wait_for_server_termination(self.inner.id, deadline)
    }

    pub fn current_state(&self) -> HarnessResult<ServerMode> {
        self.inner.env.interlock.server_mode(self.inner.id)
    }

    pub fn is_active(&self) -> HarnessResult<bool> {
        Ok(self.current_state()? == ServerMode::Active)
    }

    pub fn set_crash_expected(&self, expected: bool) -> HarnessResult<()> {
        self.inner
            .env
            .interlock
            .set_crash_expected(self.inner.id, expected)
    }

    /// A unit that can be started: a fresh one in the same slot if this one
    /// was a one-shot that has already run, otherwise this one.
    pub fn new_instance(&self) -> HarnessResult<ServerUnit> {
        let inner = &self.inner;
        if !(inner.env.launcher.is_one_shot() && inner.started.load(Ordering::SeqCst)) {
            return Ok(self.clone());
        }

        let id = inner.env.interlock.renew_server(inner.id)?;
        Ok(ServerUnit::new(
            id,
            inner.name.clone(),
            inner.index,
            inner.working_dir.clone(),
            Arc::clone(&inner.env),
        ))
    }
}

impl ServerUnitInner {
    fn launch_context(&self) -> LaunchContext {
        LaunchContext {
            name: self.name.clone(),
            index: self.index,
            working_dir: self.working_dir.clone(),
        }
    }

    fn watch(self: Arc<Self>, logs: UnitLogs, launched: LaunchedServer) {
        let interlock = &self.env.interlock;
        let mut run = Some((logs, launched));

        while let Some((logs, launched)) = run.take() {
            match self.drain(logs, launched) {
                ExitOutcome::Exited { status } => {
                    if let Err(e) = interlock.server_did_terminate(self.id, &status) {
                        error!("{}: failed to report termination: {e}", self.name);
                    }
                }
                ExitOutcome::RestartInPlace => {
                    if let Err(e) = interlock.server_will_restart(self.id) {
                        error!("{}: failed to report restart: {e}", self.name);
                        return;
                    }
                    // checked after the PID is cleared, so a stop either sees
                    // the new PID or is seen here
                    if self.stop_requested.load(Ordering::SeqCst) {
                        info!("{} was stopped while restarting", self.name);
                        if let Err(e) =
                            interlock.server_did_terminate(self.id, "stopped while restarting")
                        {
                            error!("{}: failed to report termination: {e}", self.name);
                        }
                        return;
                    }
                    run = match self.relaunch() {
                        Ok(next) => Some(next),
                        Err(e) => {
                            let status = format!("relaunch failed: {e}");
                            if let Err(e) = interlock.server_did_terminate(self.id, &status) {
                                error!("{}: failed to report termination: {e}", self.name);
                            }
                            None
                        }
                    };
                }
            }
        }
    }

    fn relaunch(&self) -> HarnessResult<(UnitLogs, LaunchedServer)> {
        info!("Relaunching {} in place", self.name);
        let logs = UnitLogs::open(&self.working_dir)?;
        let launched = self.env.launcher.launch(&self.launch_context())?;
        Ok((logs, launched))
    }

    /// Scan both streams to their end, then wait for the exit. The log files
    /// are closed by the time this returns.
    fn drain(&self, logs: UnitLogs, launched: LaunchedServer) -> ExitOutcome {
        let LaunchedServer {
            stdout,
            stderr,
            exit,
        } = launched;
        let (stdout_sink, stderr_sink) = logs.into_sinks();

        let stderr_pump = self.spawn_stderr_pump(stderr, stderr_sink);

        let handler = ServerTriggerHandler::new(
            self.id,
            self.name.clone(),
            self.env.pid_phrase.clone(),
            Arc::clone(&self.env.interlock),
            SeverityHandler::new(
                self.name.clone(),
                Arc::clone(&self.env.interlock),
                Arc::clone(&self.env.severity),
            ),
        );
        let mut scanner = TriggerScanner::new(
            self.name.clone(),
            Arc::clone(&self.env.server_triggers),
            Some(stdout_sink),
            handler,
        );
        if let Err(e) = scanner.pump(stdout) {
            warn!("{}: stdout read failed: {e}", self.name);
        }
        drop(scanner);

        let outcome = exit.wait();
        if let Some(pump) = stderr_pump
            && pump.join().is_err()
        {
            error!("{}: stderr pump panicked", self.name);
        }
        outcome
    }

    fn spawn_stderr_pump(
        &self,
        stderr: Box<dyn std::io::Read + Send>,
        sink: Box<dyn Write + Send>,
    ) -> Option<thread::JoinHandle<()>> {
        let unit = format!("{}/stderr", self.name);
        let mut scanner = TriggerScanner::new(
            unit.clone(),
            Arc::clone(&self.env.stderr_triggers),
            Some(sink),
            SeverityHandler::new(
                self.name.clone(),
                Arc::clone(&self.env.interlock),
                Arc::clone(&self.env.severity),
            ),
        );

        let spawned = thread::Builder::new()
            .name(format!("stderr-{}", self.name))
            .spawn(move || {
                if let Err(e) = scanner.pump(stderr) {
                    warn!("{unit}: read failed: {e}");
                }
            });
        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("{}: stderr pump not started: {e}", self.name);
                None
            }
        }
    }
}
