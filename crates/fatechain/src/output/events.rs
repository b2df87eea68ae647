use std::io::Write;

use fatechain_ops::traits::{EventError, EventSink};

/// Prints progress events to stdout as they happen.
pub(crate) struct ConsoleEventSink;

impl EventSink for ConsoleEventSink {
    fn publish(&self, message: &str) -> Result<(), EventError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "event: {message}").map_err(|e| EventError(e.to_string()))
    }
}
