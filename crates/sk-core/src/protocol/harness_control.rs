//! Client side of the control protocol.
//!
//! A client writes `SYN:<OPCODE>` on its stdout and blocks reading stdin
//! until the harness answers `ACK:<OPCODE>` or `FATAL:<message>`. Lines that
//! are neither (including acks for opcodes this build does not know) are
//! skipped.

use crate::{ControlLine, ControlOpcode, CoreError, CoreErrorResult};

use std::io::{self, BufRead, StdinLock, Stdout, Write};
use std::panic::Location;

use error_location::ErrorLocation;

pub struct HarnessControl<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl HarnessControl<StdinLock<'static>, Stdout> {
    /// Control channel over the process's own stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> HarnessControl<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    #[track_caller]
    pub fn request(&mut self, op: ControlOpcode) -> CoreErrorResult<()> {
        let caller = Location::caller();

        writeln!(self.writer, "{}", ControlLine::request(op))?;
        self.writer.flush()?;

        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(CoreError::ControlChannelClosed {
                    opcode: op.to_string(),
                    location: ErrorLocation::from(caller),
                });
            }

            match ControlLine::parse(&line) {
                ControlLine::Ack(acked) if acked == op => return Ok(()),
                ControlLine::Fatal(message) => {
                    return Err(CoreError::ControlFatal {
                        opcode: op.to_string(),
                        message,
                        location: ErrorLocation::from(caller),
                    });
                }
                _ => continue,
            }
        }
    }

    #[track_caller]
    pub fn synchronize(&mut self) -> CoreErrorResult<()> {
        self.request(ControlOpcode::Synchronize)
    }

    #[track_caller]
    pub fn terminate_active(&mut self) -> CoreErrorResult<()> {
        self.request(ControlOpcode::TerminateActive)
    }

    #[track_caller]
    pub fn terminate_one_passive(&mut self) -> CoreErrorResult<()> {
        self.request(ControlOpcode::TerminateOnePassive)
    }

    #[track_caller]
    pub fn terminate_one_diagnostic(&mut self) -> CoreErrorResult<()> {
        self.request(ControlOpcode::TerminateOneDiagnostic)
    }

    #[track_caller]
    pub fn start_one_server(&mut self) -> CoreErrorResult<()> {
        self.request(ControlOpcode::StartOneServer)
    }

    #[track_caller]
    pub fn start_all_servers(&mut self) -> CoreErrorResult<()> {
        self.request(ControlOpcode::StartAllServers)
    }

    #[track_caller]
    pub fn shut_down_stripe(&mut self) -> CoreErrorResult<()> {
        self.request(ControlOpcode::ShutDownStripe)
    }

    #[track_caller]
    pub fn wait_for_active(&mut self) -> CoreErrorResult<()> {
        self.request(ControlOpcode::WaitForActive)
    }

    #[track_caller]
    pub fn wait_for_passives_in_standby(&mut self) -> CoreErrorResult<()> {
        self.request(ControlOpcode::WaitForPassivesInStandby)
    }

    #[track_caller]
    pub fn client_shutdown(&mut self) -> CoreErrorResult<()> {
        self.request(ControlOpcode::ClientShutdown)
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}
