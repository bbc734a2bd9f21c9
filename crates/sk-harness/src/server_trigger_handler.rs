use crate::{
    ServerId, SeverityHandler, StateInterlock, TriggerAction, TriggerHandler,
};

use std::sync::Arc;

use log::{error, info};

/// Turns a server's log triggers into interlock transitions.
pub struct ServerTriggerHandler {
    id: ServerId,
    name: String,
    pid_phrase: String,
    interlock: Arc<StateInterlock>,
    severity: SeverityHandler,
}

impl ServerTriggerHandler {
    pub fn new(
        id: ServerId,
        name: String,
        pid_phrase: String,
        interlock: Arc<StateInterlock>,
        severity: SeverityHandler,
    ) -> Self {
        Self {
            id,
            name,
            pid_phrase,
            interlock,
            severity,
        }
    }
}

impl TriggerHandler for ServerTriggerHandler {
    fn on_trigger(&mut self, action: TriggerAction, line: &str) {
        let result = match action {
            TriggerAction::Pid => match parse_pid(line, &self.pid_phrase) {
                Some(pid) => self.interlock.server_did_report_pid(self.id, pid),
                None => {
                    error!("Unexpected PID-like line from {}: {line}", self.name);
                    Ok(())
                }
            },
            TriggerAction::Bootstrap => self.interlock.server_did_bootstrap(self.id),
            TriggerAction::Active => self.interlock.server_became_active(self.id).map(|was_passive| {
                if was_passive {
                    info!("{} promoted from passive", self.name);
                }
            }),
            TriggerAction::Passive => self.interlock.server_became_passive(self.id),
            TriggerAction::Diagnostic => self.interlock.server_became_diagnostic(self.id),
            TriggerAction::Zap => {
                info!("{} restarted due to ZAP", self.name);
                self.interlock.server_was_zapped(self.id)
            }
            TriggerAction::Severity => {
                self.severity.check(line);
                Ok(())
            }
            TriggerAction::Control => Ok(()),
        };

        if let Err(e) = result {
            error!("{}: {action:?} trigger failed: {e}", self.name);
        }
    }
}

/// The decimal number following `phrase`, if there is a positive one.
pub(crate) fn parse_pid(line: &str, phrase: &str) -> Option<u32> {
    let (_, rest) = line.split_once(phrase)?;
    let digits: String = rest
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok().filter(|pid| *pid > 0)
}
