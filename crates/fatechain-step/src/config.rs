use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::step::WaitHint;

/// Hint used when a reservation conflict is retried rather than failed.
const CONFLICT_RETRY_HINT: WaitHint = WaitHint::from_millis(100);

/// How long to park a chain whose head step is not ready.
///
/// `polls` is the number of consecutive not-ready polls, starting at 1.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackoffPolicy {
    /// Wait exactly as long as the step asked.
    #[default]
    Hint,
    /// Ignore the hint and always wait `delay_ms`.
    Fixed { delay_ms: u64 },
    /// The hint plus `step_ms` for every poll after the first, capped at `max_ms`.
    Linear { step_ms: u64, max_ms: u64 },
    /// `initial_ms * factor^(polls - 1)`, never below the hint, capped at `max_ms`.
    Exponential {
        initial_ms: u64,
        factor: u32,
        max_ms: u64,
    },
}

impl BackoffPolicy {
    #[must_use]
    pub fn delay(&self, polls: u32, hint: WaitHint) -> Duration {
        let hint = hint.as_duration();
        let retries = polls.saturating_sub(1);
        match *self {
            Self::Hint => hint,
            Self::Fixed { delay_ms } => Duration::from_millis(delay_ms),
            Self::Linear { step_ms, max_ms } => {
                let extra = Duration::from_millis(step_ms.saturating_mul(u64::from(retries)));
                hint.saturating_add(extra).min(Duration::from_millis(max_ms))
            }
            Self::Exponential {
                initial_ms,
                factor,
                max_ms,
            } => {
                let scale = u64::from(factor).saturating_pow(retries);
                Duration::from_millis(initial_ms.saturating_mul(scale))
                    .max(hint)
                    .min(Duration::from_millis(max_ms))
            }
        }
    }
}

/// What to do when `is_ready` reports a reservation conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Fail the chain and unwind.
    #[default]
    Fail,
    /// Treat the conflict as "not ready" and poll again.
    Retry,
}

impl ConflictPolicy {
    pub(crate) fn retry_hint(self) -> Option<WaitHint> {
        match self {
            Self::Fail => None,
            Self::Retry => Some(CONFLICT_RETRY_HINT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutorConfig {
    pub backoff: BackoffPolicy,
    pub on_conflict: ConflictPolicy,
    /// Fail a chain whose head is not ready after this many consecutive polls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_polls: Option<u32>,
}

impl ExecutorConfig {
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    #[must_use]
    pub fn with_conflict_policy(mut self, on_conflict: ConflictPolicy) -> Self {
        self.on_conflict = on_conflict;
        self
    }

    #[must_use]
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HINT: WaitHint = WaitHint::from_millis(100);

    #[test]
    fn hint_policy_uses_step_hint() {
        assert_eq!(
            BackoffPolicy::Hint.delay(5, HINT),
            Duration::from_millis(100)
        );
    }

    #[test]
    fn fixed_policy_ignores_hint() {
        let policy = BackoffPolicy::Fixed { delay_ms: 250 };

        assert_eq!(policy.delay(1, HINT), Duration::from_millis(250));
        assert_eq!(policy.delay(9, HINT), Duration::from_millis(250));
    }

    #[test]
    fn linear_policy_grows_by_step_and_caps() {
        let policy = BackoffPolicy::Linear {
            step_ms: 50,
            max_ms: 220,
        };

        assert_eq!(policy.delay(1, HINT), Duration::from_millis(100));
        assert_eq!(policy.delay(2, HINT), Duration::from_millis(150));
        assert_eq!(policy.delay(3, HINT), Duration::from_millis(200));
        assert_eq!(policy.delay(4, HINT), Duration::from_millis(220));
    }

    #[test]
    fn exponential_policy_doubles_and_caps() {
        let policy = BackoffPolicy::Exponential {
            initial_ms: 100,
            factor: 2,
            max_ms: 1000,
        };

        assert_eq!(policy.delay(1, HINT), Duration::from_millis(100));
        assert_eq!(policy.delay(2, HINT), Duration::from_millis(200));
        assert_eq!(policy.delay(4, HINT), Duration::from_millis(800));
        assert_eq!(policy.delay(5, HINT), Duration::from_millis(1000));
        assert_eq!(policy.delay(60, HINT), Duration::from_millis(1000));
    }

    #[test]
    fn exponential_policy_never_undercuts_hint() {
        let policy = BackoffPolicy::Exponential {
            initial_ms: 10,
            factor: 2,
            max_ms: 1000,
        };

        assert_eq!(policy.delay(1, HINT), Duration::from_millis(100));
    }

    #[test]
    fn conflict_retry_hint_only_when_retrying() {
        assert!(ConflictPolicy::Fail.retry_hint().is_none());
        assert!(ConflictPolicy::Retry.retry_hint().is_some());
    }

    #[test]
    fn config_parses_from_toml() {
        let config: ExecutorConfig = toml::from_str(
            r#"
on_conflict = "retry"
max_polls = 30

[backoff]
kind = "exponential"
initial_ms = 100
factor = 2
max_ms = 5000
"#,
        )
        .expect("parse");

        assert_eq!(config.on_conflict, ConflictPolicy::Retry);
        assert_eq!(config.max_polls, Some(30));
        assert_eq!(
            config.backoff,
            BackoffPolicy::Exponential {
                initial_ms: 100,
                factor: 2,
                max_ms: 5000
            }
        );
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: ExecutorConfig = toml::from_str("").expect("parse");

        assert_eq!(config, ExecutorConfig::default());
    }
}
