use crate::TriggerAction;

use sk_config::TriggerConfig;
use sk_core::SYN_PREFIX;

/// Ordered `(substring, action)` pairs evaluated against every line.
#[derive(Debug, Clone, Default)]
pub struct TriggerTable {
    entries: Vec<(String, TriggerAction)>,
}

impl TriggerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<S: Into<String>>(mut self, phrase: S, action: TriggerAction) -> Self {
        self.entries.push((phrase.into(), action));
        self
    }

    /// Server stdout: state announcements, plus severity markers when enabled.
    pub fn server(triggers: &TriggerConfig, fail_on_log_severity: bool) -> Self {
        let table = Self::new()
            .with(triggers.pid.clone(), TriggerAction::Pid)
            .with(triggers.bootstrap.clone(), TriggerAction::Bootstrap)
            .with(triggers.active.clone(), TriggerAction::Active)
            .with(triggers.passive.clone(), TriggerAction::Passive)
            .with(triggers.diagnostic.clone(), TriggerAction::Diagnostic)
            .with(triggers.zap.clone(), TriggerAction::Zap);
        table.with_severity(triggers, fail_on_log_severity)
    }

    /// Client stdout: control requests, plus severity markers when enabled.
    pub fn client(triggers: &TriggerConfig, fail_on_log_severity: bool) -> Self {
        Self::new()
            .with(SYN_PREFIX, TriggerAction::Control)
            .with_severity(triggers, fail_on_log_severity)
    }

    /// Stderr of any unit: severity markers only, when enabled.
    pub fn severity_only(triggers: &TriggerConfig, fail_on_log_severity: bool) -> Self {
        Self::new().with_severity(triggers, fail_on_log_severity)
    }

    fn with_severity(mut self, triggers: &TriggerConfig, enabled: bool) -> Self {
        if enabled {
            for marker in &triggers.severity_markers {
                self = self.with(marker.clone(), TriggerAction::Severity);
            }
        }
        self
    }

    /// Actions whose phrase occurs in `line`, in table order, each at most once.
    pub fn matches(&self, line: &str) -> Vec<TriggerAction> {
        let mut actions = Vec::new();
        for (phrase, action) in &self.entries {
            if !actions.contains(action) && line.contains(phrase.as_str()) {
                actions.push(*action);
            }
        }
        actions
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
