use crate::{ACK_PREFIX, ControlOpcode, FATAL_PREFIX, SYN_PREFIX};

/// One line of the control protocol, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlLine {
    /// `SYN:<OPCODE>` from a client
    Request(ControlOpcode),
    /// `SYN:` with an opcode this side does not know
    UnknownRequest(String),
    /// `ACK:<OPCODE>` from the harness
    Ack(ControlOpcode),
    /// `ACK:` with an opcode this side does not know
    UnknownAck(String),
    /// `FATAL:<message>` from the harness
    Fatal(String),
    /// Ordinary output
    Output,
}

impl ControlLine {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();

        if let Some(opcode) = line.strip_prefix(SYN_PREFIX) {
            return match ControlOpcode::from_wire(opcode) {
                Some(op) => Self::Request(op),
                None => Self::UnknownRequest(opcode.to_string()),
            };
        }

        if let Some(opcode) = line.strip_prefix(ACK_PREFIX) {
            return match ControlOpcode::from_wire(opcode) {
                Some(op) => Self::Ack(op),
                None => Self::UnknownAck(opcode.to_string()),
            };
        }

        if let Some(message) = line.strip_prefix(FATAL_PREFIX) {
            return Self::Fatal(message.to_string());
        }

        Self::Output
    }

    pub fn request(op: ControlOpcode) -> String {
        format!("{SYN_PREFIX}{op}")
    }

    pub fn ack(op: ControlOpcode) -> String {
        format!("{ACK_PREFIX}{op}")
    }

    /// FATAL lines are single-line; embedded line breaks are flattened.
    pub fn fatal(message: &str) -> String {
        let flat: String = message
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        format!("{FATAL_PREFIX}{flat}")
    }
}
