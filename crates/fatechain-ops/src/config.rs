use serde::{Deserialize, Serialize};

const DEFAULT_RETRY_HINT_MS: u64 = 100;

/// Knobs for how operation steps treat busy reservations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperationConfig {
    /// Wait hint returned by `is_ready` while a reservation is busy.
    pub retry_hint_ms: u64,
    /// When false, a busy reservation fails the step with a conflict instead
    /// of asking to be polled again.
    pub wait_on_busy: bool,
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self {
            retry_hint_ms: DEFAULT_RETRY_HINT_MS,
            wait_on_busy: true,
        }
    }
}

impl OperationConfig {
    #[must_use]
    pub fn with_retry_hint_ms(mut self, retry_hint_ms: u64) -> Self {
        self.retry_hint_ms = retry_hint_ms;
        self
    }

    #[must_use]
    pub fn with_wait_on_busy(mut self, wait_on_busy: bool) -> Self {
        self.wait_on_busy = wait_on_busy;
        self
    }
}
