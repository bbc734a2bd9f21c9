use crate::{ClusterControl, SeverityHandler, TriggerAction, TriggerHandler, dispatch};

use sk_core::{ControlLine, SYN_PREFIX};

use std::io::Write;
use std::sync::Arc;

use log::{error, info, warn};

/// Answers a client's control requests on its stdin.
///
/// The requested operation runs on the scanning thread, so the client's
/// output is not read any further until it has completed.
pub struct ClientTriggerHandler<W: Write + Send> {
    name: String,
    stdin: W,
    control: Arc<dyn ClusterControl>,
    severity: SeverityHandler,
}

impl<W: Write + Send> ClientTriggerHandler<W> {
    pub fn new(
        name: String,
        stdin: W,
        control: Arc<dyn ClusterControl>,
        severity: SeverityHandler,
    ) -> Self {
        Self {
            name,
            stdin,
            control,
            severity,
        }
    }

    fn answer(&mut self, line: &str) {
        // the trigger fires anywhere in the line, so a log prefix may precede the request
        let request = line.find(SYN_PREFIX).map_or(line, |at| &line[at..]);
        let reply = match ControlLine::parse(request) {
            ControlLine::Request(op) => {
                info!("{} requested {op}", self.name);
                match dispatch(self.control.as_ref(), op) {
                    Ok(()) => ControlLine::ack(op),
                    Err(e) => {
                        error!("{}: {op} failed: {e}", self.name);
                        ControlLine::fatal(&e.to_string())
                    }
                }
            }
            ControlLine::UnknownRequest(op) => {
                warn!("{} sent unknown control request {op:?}, ignoring", self.name);
                return;
            }
            _ => {
                warn!("{} matched a control trigger without a request: {line:?}", self.name);
                return;
            }
        };

        if let Err(e) = writeln!(self.stdin, "{reply}").and_then(|()| self.stdin.flush()) {
            warn!("{}: could not answer on stdin: {e}", self.name);
        }
    }

    pub fn into_stdin(self) -> W {
        self.stdin
    }
}

impl<W: Write + Send> TriggerHandler for ClientTriggerHandler<W> {
    fn on_trigger(&mut self, action: TriggerAction, line: &str) {
        match action {
            TriggerAction::Control => self.answer(line),
            TriggerAction::Severity => self.severity.check(line),
            _ => {}
        }
    }
}
