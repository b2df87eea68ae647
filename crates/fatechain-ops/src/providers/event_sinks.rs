use std::sync::Mutex;

use tracing::info;

use crate::traits::{EventError, EventSink};

#[derive(Debug, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn publish(&self, _message: &str) -> Result<(), EventError> {
        Ok(())
    }
}

/// Writes each event to the `tracing` log at `info`.
#[derive(Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn publish(&self, message: &str) -> Result<(), EventError> {
        info!(target: "fatechain::events", "{message}");
        Ok(())
    }
}

/// Keeps every published event, in order.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingEventSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

impl EventSink for RecordingEventSink {
    fn publish(&self, message: &str) -> Result<(), EventError> {
        self.messages
            .lock()
            .map_err(|_| EventError("recording sink lock poisoned".to_string()))?
            .push(message.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_sink_accepts_every_event() {
        let sink = TracingEventSink;

        assert!(sink.publish("deleted table t1").is_ok());
        assert!(sink.publish("").is_ok());
    }
}
