use crate::{FailureCause, SeverityFilter, StateInterlock, TriggerAction, TriggerHandler};

use std::sync::Arc;

/// Handler for streams that only carry severity triggers.
pub struct SeverityHandler {
    unit: String,
    interlock: Arc<StateInterlock>,
    filter: Arc<SeverityFilter>,
}

impl SeverityHandler {
    pub fn new(unit: String, interlock: Arc<StateInterlock>, filter: Arc<SeverityFilter>) -> Self {
        Self {
            unit,
            interlock,
            filter,
        }
    }

    pub fn check(&self, line: &str) {
        if self.filter.is_failure(line) {
            self.interlock.test_did_fail(FailureCause::LogSeverity {
                unit: self.unit.clone(),
                line: line.to_string(),
            });
        }
    }
}

impl TriggerHandler for SeverityHandler {
    fn on_trigger(&mut self, action: TriggerAction, line: &str) {
        if action == TriggerAction::Severity {
            self.check(line);
        }
    }
}
