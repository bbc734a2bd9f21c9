use crate::launch::ServerLauncher;
use crate::{SeverityFilter, StateInterlock, TriggerTable};

use sk_config::TriggerConfig;

use std::sync::Arc;

/// What every unit of one run shares.
pub struct UnitEnvironment {
    pub interlock: Arc<StateInterlock>,
    pub launcher: Arc<dyn ServerLauncher>,
    pub server_triggers: Arc<TriggerTable>,
    pub client_triggers: Arc<TriggerTable>,
    pub stderr_triggers: Arc<TriggerTable>,
    pub severity: Arc<SeverityFilter>,
    pub pid_phrase: String,
}

impl UnitEnvironment {
    pub fn new(
        interlock: Arc<StateInterlock>,
        launcher: Arc<dyn ServerLauncher>,
        triggers: &TriggerConfig,
        fail_on_log_severity: bool,
    ) -> Self {
        Self {
            interlock,
            launcher,
            server_triggers: Arc::new(TriggerTable::server(triggers, fail_on_log_severity)),
            client_triggers: Arc::new(TriggerTable::client(triggers, fail_on_log_severity)),
            stderr_triggers: Arc::new(TriggerTable::severity_only(
                triggers,
                fail_on_log_severity,
            )),
            severity: Arc::new(SeverityFilter::new(triggers.severity_allow_list.clone())),
            pid_phrase: triggers.pid.clone(),
        }
    }
}
