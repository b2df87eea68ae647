use thiserror::Error;

#[derive(Debug, Error)]
#[error("event sink unavailable: {0}")]
pub struct EventError(pub String);

/// Destination for human-readable progress events.
pub trait EventSink: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the event could not be delivered. Callers treat
    /// delivery as best effort.
    fn publish(&self, message: &str) -> Result<(), EventError>;
}
