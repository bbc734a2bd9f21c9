use crate::TriggerAction;

/// Receives every matched trigger, on the thread scanning the stream.
pub trait TriggerHandler: Send {
    fn on_trigger(&mut self, action: TriggerAction, line: &str);
}
