use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::providers::NoopEventSink;
use crate::traits::EventSink;

/// Best-effort progress notifications for operators.
///
/// Delivery failures are logged and dropped; an event never fails the step
/// that emitted it.
#[derive(Clone)]
pub struct EventNotifier {
    sink: Arc<dyn EventSink>,
}

impl EventNotifier {
    #[must_use]
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    #[must_use]
    pub fn noop() -> Self {
        Self::new(Arc::new(NoopEventSink))
    }

    pub fn event(&self, args: fmt::Arguments<'_>) {
        let message = fmt::format(args);
        if let Err(error) = self.sink.publish(&message) {
            warn!(%error, %message, "dropped event");
        }
    }
}

impl Default for EventNotifier {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for EventNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventNotifier").finish_non_exhaustive()
    }
}
