use crate::{TriggerHandler, TriggerTable};

use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::Arc;

use log::{debug, warn};

/// Line-oriented matcher between a unit's output and its log file.
///
/// Each line is first dispatched to the handler for every trigger it
/// matches, then written to the sink and echoed to the harness log.
pub struct TriggerScanner<H: TriggerHandler> {
    unit: String,
    table: Arc<TriggerTable>,
    sink: Option<Box<dyn Write + Send>>,
    handler: H,
}

impl<H: TriggerHandler> TriggerScanner<H> {
    pub fn new(
        unit: String,
        table: Arc<TriggerTable>,
        sink: Option<Box<dyn Write + Send>>,
        handler: H,
    ) -> Self {
        Self {
            unit,
            table,
            sink,
            handler,
        }
    }

    pub fn scan_line(&mut self, line: &str) {
        for action in self.table.matches(line) {
            self.handler.on_trigger(action, line);
        }

        if let Some(sink) = self.sink.as_mut()
            && let Err(e) = writeln!(sink, "{line}")
        {
            warn!("[{}] log sink failed, dropping it: {e}", self.unit);
            self.sink = None;
        }
        debug!("[{}] {line}", self.unit);
    }

    /// Scan until end of stream. Invalid UTF-8 is replaced, never fatal.
    pub fn pump<R: Read>(&mut self, reader: R) -> io::Result<usize> {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        let mut lines = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let text = String::from_utf8_lossy(&buf);
            self.scan_line(text.trim_end_matches(['\r', '\n']));
            lines += 1;
        }

        if let Some(sink) = self.sink.as_mut() {
            sink.flush()?;
        }
        Ok(lines)
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Drops the sink, closing the log file behind it.
    pub fn into_handler(self) -> H {
        self.handler
    }
}
