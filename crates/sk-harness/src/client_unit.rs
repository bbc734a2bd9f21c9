//! One client process of a run.
//!
//! A client is started once, on its own thread. That thread spawns the
//! process, scans its stdout for control requests (answering them on its
//! stdin), waits for the exit, tells the listener and finally leaves the
//! interlock.

use crate::launch::{ProcessCommand, kill_process};
use crate::{
    AdmissionGate, ClientExitListener, ClientId, ClientTriggerHandler, ClusterControl,
    HarnessError, HarnessResult, SeverityHandler, TriggerScanner, UnitEnvironment, UnitLogs,
};

use std::io;
use std::path::PathBuf;
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use log::{error, info, warn};

const REAP_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessSlot {
    NotStarted,
    Running { pid: u32 },
    Exited(Option<i32>),
    FailedToStart,
}

#[derive(Debug)]
struct ClientState {
    process: ProcessSlot,
    /// Listener told and interlock left
    finished: bool,
}

#[derive(Clone)]
pub struct ClientUnit {
    inner: Arc<ClientUnitInner>,
}

struct ClientUnitInner {
    id: ClientId,
    name: String,
    command: ProcessCommand,
    working_dir: PathBuf,
    env: Arc<UnitEnvironment>,
    control: Arc<dyn ClusterControl>,
    gate: AdmissionGate,
    started: AtomicBool,
    state: Mutex<ClientState>,
    assigned: Condvar,
}

impl ClientUnit {
    pub fn new(
        id: ClientId,
        command: ProcessCommand,
        working_dir: PathBuf,
        env: Arc<UnitEnvironment>,
        control: Arc<dyn ClusterControl>,
    ) -> Self {
        let name = id.name();
        Self {
            inner: Arc::new(ClientUnitInner {
                id,
                gate: AdmissionGate::new(name.clone()),
                name,
                command,
                working_dir,
                env,
                control,
                started: AtomicBool::new(false),
                state: Mutex::new(ClientState {
                    process: ProcessSlot::NotStarted,
                    finished: false,
                }),
                assigned: Condvar::new(),
            }),
        }
    }

    pub fn id(&self) -> ClientId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn process(&self) -> ProcessSlot {
        self.inner.lock().process
    }

    /// Exit code once the process has exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self.inner.lock().process {
            ProcessSlot::Exited(code) => code,
            _ => None,
        }
    }

    /// Start the client on its own thread. The client must already be
    /// registered with the interlock; it deregisters itself when done.
    pub fn start(&self, listener: Option<Arc<dyn ClientExitListener>>) -> HarnessResult<()> {
        self.inner.gate.with_admission(|| {
            if self.inner.started.swap(true, Ordering::SeqCst) {
                return Err(HarnessError::one_shot_reused(self.inner.name.clone()));
            }

            let inner = Arc::clone(&self.inner);
            let spawned = thread::Builder::new()
                .name(self.inner.name.clone())
                .spawn(move || inner.run(listener));
            if let Err(e) = spawned {
                self.inner.set_process(ProcessSlot::FailedToStart);
                self.inner.env.interlock.client_did_terminate(self.inner.id);
                self.inner.finish();
                return Err(e.into());
            }
            Ok(())
        })
    }

    /// Kill the client, waiting first for its process to exist if it is
    /// still being spawned.
    pub fn force_terminate(&self) -> HarnessResult<()> {
        self.inner
            .gate
            .with_admission(|| self.inner.kill_assigned(None))
            .map(drop)
    }

    /// Bounded `force_terminate`: `Ok(false)` if the process was not
    /// assigned by `deadline`.
    pub fn force_terminate_within(&self, deadline: Instant) -> HarnessResult<bool> {
        Ok(self
            .inner
            .gate
            .with_admission_within(deadline, || self.inner.kill_assigned(Some(deadline)))?
            .unwrap_or(false))
    }

    /// Block until the client has exited, told its listener and left the
    /// interlock. Returns immediately for a client that was never started.
    pub fn wait_for_exit(&self) -> Option<i32> {
        if !self.inner.started.load(Ordering::SeqCst) {
            return None;
        }
        let mut state = self.inner.lock();
        while !state.finished {
            state = self
                .inner
                .assigned
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        match state.process {
            ProcessSlot::Exited(code) => code,
            _ => None,
        }
    }
}

impl ClientUnitInner {
    fn lock(&self) -> MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_process(&self, process: ProcessSlot) {
        self.lock().process = process;
        self.assigned.notify_all();
    }

    fn finish(&self) {
        self.lock().finished = true;
        self.assigned.notify_all();
    }

    fn kill_assigned(&self, deadline: Option<Instant>) -> HarnessResult<bool> {
        if !self.started.load(Ordering::SeqCst) {
            return Ok(true);
        }

        let mut state = self.lock();
        while state.process == ProcessSlot::NotStarted {
            state = match deadline {
                None => self
                    .assigned
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(false);
                    }
                    self.assigned
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }

        if let ProcessSlot::Running { pid } = state.process {
            info!("Force terminating {} (PID {pid})", self.name);
            kill_process(pid)?;
        }
        Ok(true)
    }

    fn run(&self, listener: Option<Arc<dyn ClientExitListener>>) {
        let exit_code = match self.execute() {
            Ok(code) => code,
            Err(e) => {
                error!("{} did not run: {e}", self.name);
                self.set_process(ProcessSlot::FailedToStart);
                None
            }
        };
        info!("{} terminated with exit code {exit_code:?}", self.name);

        if let Some(listener) = listener {
            listener.on_client_exit(&self.id, exit_code);
        }
        self.env.interlock.client_did_terminate(self.id);
        self.finish();
    }

    fn execute(&self) -> HarnessResult<Option<i32>> {
        let logs = UnitLogs::open(&self.working_dir)?;
        info!("Starting {}: {}", self.name, self.command);

        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| HarnessError::spawn(self.command.program.clone(), e))?;
        self.set_process(ProcessSlot::Running { pid: child.id() });

        let (stdin, stdout, stderr) = match take_pipes(&mut child) {
            Ok(pipes) => pipes,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e.into());
            }
        };
        let (stdout_sink, stderr_sink) = logs.into_sinks();

        let severity = || {
            SeverityHandler::new(
                self.name.clone(),
                Arc::clone(&self.env.interlock),
                Arc::clone(&self.env.severity),
            )
        };

        let mut stderr_scanner = TriggerScanner::new(
            format!("{}/stderr", self.name),
            Arc::clone(&self.env.stderr_triggers),
            Some(stderr_sink),
            severity(),
        );
        let stderr_name = self.name.clone();
        let stderr_pump = thread::Builder::new()
            .name(format!("stderr-{}", self.name))
            .spawn(move || {
                if let Err(e) = stderr_scanner.pump(stderr) {
                    warn!("{stderr_name}/stderr: read failed: {e}");
                }
            });

        let handler = ClientTriggerHandler::new(
            self.name.clone(),
            stdin,
            Arc::clone(&self.control),
            severity(),
        );
        let mut scanner = TriggerScanner::new(
            self.name.clone(),
            Arc::clone(&self.env.client_triggers),
            Some(stdout_sink),
            handler,
        );
        if let Err(e) = scanner.pump(stdout) {
            warn!("{}: stdout read failed: {e}", self.name);
        }
        // closes the client's stdin
        drop(scanner);

        let code = self.reap(&mut child)?;
        match stderr_pump {
            Ok(pump) => {
                if pump.join().is_err() {
                    error!("{}: stderr pump panicked", self.name);
                }
            }
            Err(e) => error!("{}: stderr pump not started: {e}", self.name),
        }
        Ok(code)
    }

    /// Wait for the exit and record it in the same critical section that
    /// `kill_assigned` reads, so a kill never reaches a reaped PID.
    fn reap(&self, child: &mut Child) -> io::Result<Option<i32>> {
        loop {
            let mut state = self.lock();
            if let Some(status) = child.try_wait()? {
                state.process = ProcessSlot::Exited(status.code());
                drop(state);
                self.assigned.notify_all();
                return Ok(status.code());
            }
            drop(state);
            thread::sleep(REAP_POLL);
        }
    }
}

fn take_pipes(child: &mut Child) -> io::Result<(ChildStdin, ChildStdout, ChildStderr)> {
    let missing = |stream: &str| io::Error::other(format!("client {stream} was not captured"));
    Ok((
        child.stdin.take().ok_or_else(|| missing("stdin"))?,
        child.stdout.take().ok_or_else(|| missing("stdout"))?,
        child.stderr.take().ok_or_else(|| missing("stderr"))?,
    ))
}
