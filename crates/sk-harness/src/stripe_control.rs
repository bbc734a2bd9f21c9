use crate::{ClusterControl, HarnessError, HarnessResult, ServerId, ServerUnit, StateInterlock};

use sk_core::ServerMode;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::info;

/// Cluster control over the server units of one stripe.
///
/// Operations are serialized: only one is in flight at a time across all
/// clients, although it may block on the interlock while it runs.
pub struct StripeControl {
    interlock: Arc<StateInterlock>,
    units: Mutex<Vec<ServerUnit>>,
    op_lock: Mutex<()>,
}

impl StripeControl {
    pub fn new(interlock: Arc<StateInterlock>, units: Vec<ServerUnit>) -> Self {
        Self {
            interlock,
            units: Mutex::new(units),
            op_lock: Mutex::new(()),
        }
    }

    fn serialized(&self, op: &str) -> MutexGuard<'_, ()> {
        let guard = self.op_lock.lock().unwrap_or_else(PoisonError::into_inner);
        info!("control: {op}");
        guard
    }

    fn lock_units(&self) -> MutexGuard<'_, Vec<ServerUnit>> {
        self.units.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The current units, in server index order.
    pub fn units(&self) -> Vec<ServerUnit> {
        self.lock_units().clone()
    }

    /// The unit behind `id`, if `id` is still the current handle of its slot.
    #[track_caller]
    pub fn unit_for(&self, id: ServerId) -> HarnessResult<ServerUnit> {
        match self.lock_units().get(id.index) {
            Some(unit) if unit.id() == id => Ok(unit.clone()),
            Some(unit) => Err(HarnessError::stale_handle(unit.name(), id.generation)),
            None => Err(HarnessError::stale_handle(format!("server {id}"), id.generation)),
        }
    }

    /// Treat every server termination as expected from now on.
    pub fn expect_crashes(&self, expect: bool) {
        self.interlock.ignore_server_crashes(expect);
    }

    /// Start every server and wait until each has reported a role.
    pub fn start_all_and_wait_ready(&self) -> HarnessResult<()> {
        let _op = self.serialized("start_all_and_wait_ready");
        self.start_terminated()?;
        self.interlock.wait_for_all_server_ready()
    }

    fn start_terminated(&self) -> HarnessResult<()> {
        for id in self.interlock.terminated_servers()? {
            self.start_unit(id)?;
        }
        Ok(())
    }

    /// Replace the unit if it cannot be restarted, start it and wait until it runs.
    fn start_unit(&self, id: ServerId) -> HarnessResult<()> {
        let fresh = self.unit_for(id)?.new_instance()?;
        self.lock_units()[id.index] = fresh.clone();
        fresh.start()?;
        let mode = fresh.wait_for_running()?;
        info!("{} is {mode}", fresh.name());
        Ok(())
    }

    fn stop_where(&self, mode: ServerMode) -> HarnessResult<()> {
        let ids = self.interlock.snapshot().ids_where(|slot| slot.mode == mode);
        for id in ids {
            self.unit_for(id)?.stop()?;
        }
        Ok(())
    }
}

impl ClusterControl for StripeControl {
    fn synchronize(&self) -> HarnessResult<()> {
        let _op = self.serialized("synchronize");
        Ok(())
    }

    fn terminate_active(&self) -> HarnessResult<()> {
        let _op = self.serialized("terminate_active");
        match self.interlock.active_server()? {
            Some(id) => self.unit_for(id)?.stop(),
            None => Err(HarnessError::no_active_server()),
        }
    }

    fn terminate_one_passive(&self) -> HarnessResult<()> {
        let _op = self.serialized("terminate_one_passive");
        match self.interlock.one_passive_server()? {
            Some(id) => self.unit_for(id)?.stop(),
            None => Ok(()),
        }
    }

    fn terminate_one_diagnostic(&self) -> HarnessResult<()> {
        let _op = self.serialized("terminate_one_diagnostic");
        match self.interlock.one_diagnostic_server()? {
            Some(id) => self.unit_for(id)?.stop(),
            None => Ok(()),
        }
    }

    fn start_one_server(&self) -> HarnessResult<()> {
        let _op = self.serialized("start_one_server");
        match self.interlock.one_terminated_server()? {
            Some(id) => self.start_unit(id),
            None => {
                info!("no terminated server to start");
                Ok(())
            }
        }
    }

    fn start_all_servers(&self) -> HarnessResult<()> {
        let _op = self.serialized("start_all_servers");
        self.start_terminated()
    }

    /// Passives go first so stopping them does not trigger an election.
    fn terminate_all_servers(&self) -> HarnessResult<()> {
        let _op = self.serialized("terminate_all_servers");
        self.interlock.wait_for_all_server_ready()?;
        self.stop_where(ServerMode::Passive)?;
        self.stop_where(ServerMode::Diagnostic)?;
        self.stop_where(ServerMode::Active)
    }

    fn wait_for_active(&self) -> HarnessResult<()> {
        let _op = self.serialized("wait_for_active");
        self.interlock.wait_for_active_server().map(drop)
    }

    fn wait_for_running_passives_in_standby(&self) -> HarnessResult<()> {
        let _op = self.serialized("wait_for_running_passives_in_standby");
        self.interlock.wait_for_all_server_ready()
    }
}
