//! The single coordination point of a run.
//!
//! Every server and client registers here, every state change happens under
//! the one lock, and every wait sleeps on the one condition variable. Waits
//! on cluster progress also watch the verdict, so a failure anywhere
//! releases all of them. Waits on termination do not: a process that was
//! asked to die is always waited for.

use crate::{
    ClientId, FailureCause, HarnessError, HarnessResult, InterlockState, ServerId, ServerSlot,
    Verdict,
};

use sk_core::ServerMode;

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

#[derive(Debug, Default)]
pub struct StateInterlock {
    state: Mutex<InterlockState>,
    changed: Condvar,
}

impl StateInterlock {
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation is a single step, so a poisoned lock still guards consistent state.
    fn lock(&self) -> MutexGuard<'_, InterlockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[track_caller]
    fn slot(state: &InterlockState, id: ServerId) -> HarnessResult<&ServerSlot> {
        match state.servers.get(id.index) {
            Some(slot) if slot.generation == id.generation => Ok(slot),
            Some(slot) => Err(HarnessError::stale_handle(slot.name.clone(), id.generation)),
            None => Err(HarnessError::stale_handle(
                format!("server {id}"),
                id.generation,
            )),
        }
    }

    #[track_caller]
    fn slot_mut(state: &mut InterlockState, id: ServerId) -> HarnessResult<&mut ServerSlot> {
        match state.servers.get_mut(id.index) {
            Some(slot) if slot.generation == id.generation => Ok(slot),
            Some(slot) => Err(HarnessError::stale_handle(slot.name.clone(), id.generation)),
            None => Err(HarnessError::stale_handle(
                format!("server {id}"),
                id.generation,
            )),
        }
    }

    fn is_current(state: &InterlockState, id: ServerId) -> bool {
        state
            .servers
            .get(id.index)
            .is_some_and(|slot| slot.generation == id.generation)
    }

    #[track_caller]
    fn check_locked(state: &InterlockState) -> HarnessResult<()> {
        match &state.verdict {
            Verdict::Failed(cause) => Err(HarnessError::test_failed(cause.clone())),
            _ => Ok(()),
        }
    }

    fn fail_locked(&self, state: &mut InterlockState, cause: FailureCause) {
        error!("Test failure: {cause}");
        if !state.verdict.is_failed() {
            state.verdict = Verdict::Failed(cause);
        }
        self.changed.notify_all();
    }

    /// Block while `blocked` holds, until `deadline` if one is given.
    fn await_condition<F>(
        &self,
        what: &str,
        deadline: Option<Instant>,
        mut blocked: F,
    ) -> MutexGuard<'_, InterlockState>
    where
        F: FnMut(&InterlockState) -> bool,
    {
        debug!("> {what}");
        let mut state = self.lock();
        while blocked(&state) {
            state = match deadline {
                None => self
                    .changed
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        debug!("< {what} (timed out)");
                        return state;
                    }
                    self.changed
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
        debug!("< {what}");
        state
    }

    /// Block while `blocked` holds and the run is still undecided.
    #[track_caller]
    fn wait_while_running<F>(
        &self,
        what: &str,
        mut blocked: F,
    ) -> HarnessResult<MutexGuard<'_, InterlockState>>
    where
        F: FnMut(&InterlockState) -> bool,
    {
        let state = self.await_condition(what, None, |s| s.verdict.is_running() && blocked(s));
        Self::check_locked(&state)?;
        Ok(state)
    }

    // ----- registration -----

    /// Treat every server termination as expected, now and at every later start.
    pub fn ignore_server_crashes(&self, ignore: bool) {
        let mut state = self.lock();
        info!("ignore_server_crashes: {ignore}");
        state.ignore_server_crashes = ignore;
        for slot in state.servers.iter_mut() {
            slot.crash_expected = ignore;
        }
        self.changed.notify_all();
    }

    /// Register a server in the `Terminated` state.
    #[track_caller]
    pub fn register_server(&self, name: &str) -> HarnessResult<ServerId> {
        let mut state = self.lock();
        if state.shutting_down {
            return Err(HarnessError::registration(
                name,
                "harness is already shutting down",
            ));
        }
        if state.servers.iter().any(|slot| slot.name == name) {
            return Err(HarnessError::registration(name, "name already registered"));
        }

        let slot = ServerSlot::new(name.to_string(), state.ignore_server_crashes);
        state.servers.push(slot);
        let id = state.id_of(state.servers.len() - 1);
        info!("register_server: {name} {id}");
        self.changed.notify_all();
        Ok(id)
    }

    /// Hand the slot of a terminated one-shot unit to its replacement.
    #[track_caller]
    pub fn renew_server(&self, id: ServerId) -> HarnessResult<ServerId> {
        let mut state = self.lock();
        let slot = Self::slot_mut(&mut state, id)?;
        if slot.mode.is_running() {
            return Err(HarnessError::already_running(slot.name.clone()));
        }

        slot.generation += 1;
        slot.pid = None;
        let renewed = id.next_generation();
        info!("renew_server: {} {id} -> {renewed}", slot.name);
        self.changed.notify_all();
        Ok(renewed)
    }

    #[track_caller]
    pub fn register_running_client(&self, client: ClientId) -> HarnessResult<()> {
        let mut state = self.lock();
        info!("register_running_client: {client}");
        if state.shutting_down {
            return Err(HarnessError::registration(
                client.name(),
                "failed to register new client when already shutting down",
            ));
        }
        if state.clients.contains(&client) {
            return Err(HarnessError::registration(
                client.name(),
                "client already registered",
            ));
        }

        state.clients.push(client);
        self.changed.notify_all();
        Ok(())
    }

    pub fn client_did_terminate(&self, client: ClientId) {
        let mut state = self.lock();
        info!("client_did_terminate: {client}");
        let before = state.clients.len();
        state.clients.retain(|c| *c != client);
        if state.clients.len() == before {
            warn!("client_did_terminate: {client} was not registered");
        }
        self.changed.notify_all();
    }

    // ----- server transitions -----

    /// `Terminated -> Startup`. Refused once shutdown has begun.
    #[track_caller]
    pub fn server_did_start(&self, id: ServerId) -> HarnessResult<()> {
        let mut state = self.lock();
        let shutting_down = state.shutting_down;
        let ignore = state.ignore_server_crashes;
        let slot = Self::slot_mut(&mut state, id)?;

        if shutting_down {
            info!("explicit stop of late arrival: {}", slot.name);
            return Err(HarnessError::registration(
                slot.name.clone(),
                "harness is shutting down",
            ));
        }
        if slot.mode.is_running() {
            return Err(HarnessError::already_running(slot.name.clone()));
        }

        slot.mode = ServerMode::Startup;
        slot.pid = None;
        slot.last_pid = None;
        slot.crash_expected = ignore;
        info!("server_did_start: {}", slot.name);
        self.changed.notify_all();
        Ok(())
    }

    pub fn server_did_report_pid(&self, id: ServerId, pid: u32) -> HarnessResult<()> {
        let mut state = self.lock();
        let slot = Self::slot_mut(&mut state, id)?;
        if !slot.mode.is_running() {
            warn!("{} reported PID {pid} while {}", slot.name, slot.mode);
            return Ok(());
        }

        slot.pid = Some(pid);
        slot.last_pid = Some(pid);
        info!("{} has PID {pid}", slot.name);
        self.changed.notify_all();
        Ok(())
    }

    /// `Startup`/`Zapped -> Unknown`.
    pub fn server_did_bootstrap(&self, id: ServerId) -> HarnessResult<()> {
        let mut state = self.lock();
        let slot = Self::slot_mut(&mut state, id)?;
        if !slot.mode.is_transitional() {
            debug!("{} bootstrap announcement while {}", slot.name, slot.mode);
            return Ok(());
        }

        slot.mode = ServerMode::Unknown;
        info!("{} is up, role not yet known", slot.name);
        self.changed.notify_all();
        Ok(())
    }

    /// Returns whether the server was passive before.
    ///
    /// A second active server is a harness bug: the state is dumped, the run
    /// fails and the transition is not applied.
    #[track_caller]
    pub fn server_became_active(&self, id: ServerId) -> HarnessResult<bool> {
        let mut state = self.lock();
        Self::slot(&state, id)?;

        if let Some(other) = state.active()
            && other != id
        {
            let message = format!(
                "{} reported active while {} is active",
                state.servers[id.index].name, state.servers[other.index].name
            );
            if state.shutting_down {
                warn!("{message} (ignored during shutdown)");
                return Ok(false);
            }
            error!("{message}\n{}", *state);
            self.fail_locked(
                &mut state,
                FailureCause::InvariantViolation {
                    message: message.clone(),
                },
            );
            return Err(HarnessError::invariant(message));
        }

        let slot = Self::slot_mut(&mut state, id)?;
        let was_passive = match slot.mode {
            ServerMode::Terminated => {
                warn!("{} reported active after terminating", slot.name);
                return Ok(false);
            }
            ServerMode::Active => return Ok(false),
            previous => previous == ServerMode::Passive,
        };

        slot.mode = ServerMode::Active;
        info!("server_became_active: {} was passive: {was_passive}", slot.name);
        self.changed.notify_all();
        Ok(was_passive)
    }

    pub fn server_became_passive(&self, id: ServerId) -> HarnessResult<()> {
        self.server_took_role(id, ServerMode::Passive)
    }

    pub fn server_became_diagnostic(&self, id: ServerId) -> HarnessResult<()> {
        self.server_took_role(id, ServerMode::Diagnostic)
    }

    fn server_took_role(&self, id: ServerId, role: ServerMode) -> HarnessResult<()> {
        let mut state = self.lock();
        let slot = Self::slot_mut(&mut state, id)?;
        match slot.mode {
            ServerMode::Terminated => {
                warn!("{} reported {role} after terminating", slot.name);
                return Ok(());
            }
            ServerMode::Active => info!("{} demoted from ACTIVE to {role}", slot.name),
            _ => info!("server_became_{}: {}", role.as_str().to_lowercase(), slot.name),
        }

        slot.mode = role;
        self.changed.notify_all();
        Ok(())
    }

    /// Internal forced restart: the PID is gone until the server reports a new one.
    pub fn server_was_zapped(&self, id: ServerId) -> HarnessResult<()> {
        let mut state = self.lock();
        let slot = Self::slot_mut(&mut state, id)?;
        if !slot.mode.is_running() {
            warn!("{} zapped while {}", slot.name, slot.mode);
            return Ok(());
        }

        info!("server_was_zapped: {} (was {})", slot.name, slot.mode);
        slot.mode = ServerMode::Zapped;
        slot.pid = None;
        self.changed.notify_all();
        Ok(())
    }

    /// An in-process unit is relaunching on the same watcher.
    pub fn server_will_restart(&self, id: ServerId) -> HarnessResult<()> {
        let mut state = self.lock();
        let slot = Self::slot_mut(&mut state, id)?;
        info!("server_will_restart: {} (was {})", slot.name, slot.mode);
        slot.mode = ServerMode::Startup;
        slot.pid = None;
        self.changed.notify_all();
        Ok(())
    }

    /// Any state `-> Terminated`. Fails the run unless the crash was expected.
    pub fn server_did_terminate(&self, id: ServerId, status: &str) -> HarnessResult<()> {
        let mut state = self.lock();
        let slot = Self::slot_mut(&mut state, id)?;
        info!(
            "server_did_terminate: {} (was {}, crash expected: {}) status: {status}",
            slot.name, slot.mode, slot.crash_expected
        );

        slot.mode = ServerMode::Terminated;
        slot.pid = None;

        let cause = match (slot.crash_expected, slot.last_pid) {
            (true, _) => None,
            (false, Some(pid)) => Some(FailureCause::UnexpectedServerCrash {
                server: slot.name.clone(),
                pid,
                status: status.to_string(),
            }),
            (false, None) => Some(FailureCause::CrashedBeforePid {
                server: slot.name.clone(),
                status: status.to_string(),
            }),
        };

        match cause {
            Some(cause) => self.fail_locked(&mut state, cause),
            None => self.changed.notify_all(),
        }
        Ok(())
    }

    pub fn set_crash_expected(&self, id: ServerId, expected: bool) -> HarnessResult<()> {
        let mut state = self.lock();
        Self::slot_mut(&mut state, id)?.crash_expected = expected;
        Ok(())
    }

    // ----- queries -----

    pub fn server_mode(&self, id: ServerId) -> HarnessResult<ServerMode> {
        Ok(Self::slot(&self.lock(), id)?.mode)
    }

    pub fn server_pid(&self, id: ServerId) -> HarnessResult<Option<u32>> {
        Ok(Self::slot(&self.lock(), id)?.pid)
    }

    pub fn server_name(&self, id: ServerId) -> HarnessResult<String> {
        Ok(Self::slot(&self.lock(), id)?.name.clone())
    }

    pub fn is_crash_expected(&self, id: ServerId) -> HarnessResult<bool> {
        Ok(Self::slot(&self.lock(), id)?.crash_expected)
    }

    pub fn is_server_running(&self, id: ServerId) -> HarnessResult<bool> {
        Ok(Self::slot(&self.lock(), id)?.mode.is_running())
    }

    /// Current handle of the server at `index`, whatever its generation.
    pub fn server_at(&self, index: usize) -> Option<ServerId> {
        let state = self.lock();
        (index < state.servers.len()).then(|| state.id_of(index))
    }

    pub fn active_server(&self) -> HarnessResult<Option<ServerId>> {
        let state = self.lock();
        Self::check_locked(&state)?;
        Ok(state.active())
    }

    pub fn one_passive_server(&self) -> HarnessResult<Option<ServerId>> {
        let state = self.lock();
        Self::check_locked(&state)?;
        Ok(state.first_where(|slot| slot.mode == ServerMode::Passive))
    }

    pub fn one_diagnostic_server(&self) -> HarnessResult<Option<ServerId>> {
        let state = self.lock();
        Self::check_locked(&state)?;
        Ok(state.first_where(|slot| slot.mode == ServerMode::Diagnostic))
    }

    /// `None` once shutdown has begun.
    pub fn one_terminated_server(&self) -> HarnessResult<Option<ServerId>> {
        Ok(self.terminated_servers()?.into_iter().next())
    }

    /// Empty once shutdown has begun.
    pub fn terminated_servers(&self) -> HarnessResult<Vec<ServerId>> {
        let state = self.lock();
        Self::check_locked(&state)?;
        if state.shutting_down {
            return Ok(Vec::new());
        }
        Ok(state.ids_where(|slot| slot.mode == ServerMode::Terminated))
    }

    pub fn running_servers(&self) -> Vec<ServerId> {
        self.lock().ids_where(|slot| slot.mode.is_running())
    }

    pub fn running_clients(&self) -> Vec<ClientId> {
        self.lock().clients.clone()
    }

    // ----- waits -----

    /// Block while the server is `Startup` or `Zapped`; returns the mode it left them for.
    pub fn wait_for_server_running(&self, id: ServerId) -> HarnessResult<ServerMode> {
        let what = format!("wait_for_server_running {id}");
        let state = self.wait_while_running(&what, |s| {
            Self::is_current(s, id) && s.servers[id.index].mode.is_transitional()
        })?;
        Ok(Self::slot(&state, id)?.mode)
    }

    /// Block until the server reports a role or terminates.
    pub fn wait_for_server_ready(&self, id: ServerId) -> HarnessResult<ServerMode> {
        let what = format!("wait_for_server_ready {id}");
        let state = self.wait_while_running(&what, |s| {
            Self::is_current(s, id) && s.servers[id.index].mode.is_settling()
        })?;
        Ok(Self::slot(&state, id)?.mode)
    }

    /// Block until the server is `Terminated`, or until `deadline`.
    /// Returns the mode at return, which is only `Terminated` if it got there.
    pub fn wait_for_server_termination(
        &self,
        id: ServerId,
        deadline: Option<Instant>,
    ) -> HarnessResult<ServerMode> {
        let what = format!("wait_for_server_termination {id}");
        let state = self.await_condition(&what, deadline, |s| {
            Self::is_current(s, id) && s.servers[id.index].mode.is_running()
        });
        Ok(Self::slot(&state, id)?.mode)
    }

    /// Block until the running server has a PID. `None` if it terminated
    /// first or `deadline` passed.
    pub fn wait_for_pid(
        &self,
        id: ServerId,
        deadline: Option<Instant>,
    ) -> HarnessResult<Option<u32>> {
        let what = format!("wait_for_pid {id}");
        let state = self.await_condition(&what, deadline, |s| {
            Self::is_current(s, id) && {
                let slot = &s.servers[id.index];
                slot.mode.is_running() && slot.pid.is_none()
            }
        });
        Ok(Self::slot(&state, id)?.pid)
    }

    /// `None` only if the run passed while waiting.
    pub fn wait_for_active_server(&self) -> HarnessResult<Option<ServerId>> {
        let state = self.wait_while_running("wait_for_active_server", |s| s.active().is_none())?;
        Ok(state.active())
    }

    /// Block while any running server has not reported a role.
    pub fn wait_for_all_server_ready(&self) -> HarnessResult<()> {
        self.wait_while_running("wait_for_all_server_ready", |s| {
            s.servers.iter().any(|slot| slot.mode.is_settling())
        })
        .map(drop)
    }

    pub fn wait_for_client_termination(&self) -> HarnessResult<()> {
        self.wait_while_running("wait_for_client_termination", |s| !s.clients.is_empty())
            .map(drop)
    }

    /// Bounded wait for no running server and no registered client.
    pub fn wait_for_empty(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.await_condition("wait_for_empty", Some(deadline), |s| !s.is_empty())
            .is_empty()
    }

    // ----- verdict -----

    pub fn test_did_fail(&self, cause: FailureCause) {
        let mut state = self.lock();
        self.fail_locked(&mut state, cause);
    }

    pub fn set_test_did_pass_if_not_failed(&self) {
        let mut state = self.lock();
        if state.verdict.is_running() {
            info!("Test passed");
            state.verdict = Verdict::Passed;
            self.changed.notify_all();
        }
    }

    /// `Ok(true)` once passed, `Ok(false)` while running, the failure otherwise.
    pub fn check_did_pass(&self) -> HarnessResult<bool> {
        let state = self.lock();
        Self::check_locked(&state)?;
        Ok(state.verdict.is_passed())
    }

    pub fn verdict(&self) -> Verdict {
        self.lock().verdict.clone()
    }

    // ----- shutdown -----

    /// From here on no client registers and no server starts.
    pub fn begin_shutdown(&self) {
        let mut state = self.lock();
        info!("> force_shutdown");
        state.shutting_down = true;
        self.changed.notify_all();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.lock().shutting_down
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn summary(&self) -> String {
        self.lock().summary()
    }

    pub fn snapshot(&self) -> InterlockState {
        self.lock().clone()
    }

    pub fn dump(&self) -> String {
        self.lock().to_string()
    }
}
