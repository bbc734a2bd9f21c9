use crate::HarnessResult;

use sk_core::ControlOpcode;

/// The cluster operations a test client may request while it runs.
pub trait ClusterControl: Send + Sync {
    /// Barrier with no effect on the cluster.
    fn synchronize(&self) -> HarnessResult<()>;
    fn terminate_active(&self) -> HarnessResult<()>;
    fn terminate_one_passive(&self) -> HarnessResult<()>;
    fn terminate_one_diagnostic(&self) -> HarnessResult<()>;
    fn start_one_server(&self) -> HarnessResult<()>;
    fn start_all_servers(&self) -> HarnessResult<()>;
    fn terminate_all_servers(&self) -> HarnessResult<()>;
    fn wait_for_active(&self) -> HarnessResult<()>;
    fn wait_for_running_passives_in_standby(&self) -> HarnessResult<()>;
}

/// Run the operation a control opcode names.
pub fn dispatch(control: &dyn ClusterControl, op: ControlOpcode) -> HarnessResult<()> {
    match op {
        ControlOpcode::Synchronize => control.synchronize(),
        ControlOpcode::TerminateActive => control.terminate_active(),
        ControlOpcode::TerminateOnePassive => control.terminate_one_passive(),
        ControlOpcode::TerminateOneDiagnostic => control.terminate_one_diagnostic(),
        ControlOpcode::StartOneServer => control.start_one_server(),
        ControlOpcode::StartAllServers => control.start_all_servers(),
        ControlOpcode::ShutDownStripe => control.terminate_all_servers(),
        ControlOpcode::WaitForActive => control.wait_for_active(),
        ControlOpcode::WaitForPassivesInStandby => control.wait_for_running_passives_in_standby(),
        ControlOpcode::ClientShutdown => Ok(()),
    }
}
