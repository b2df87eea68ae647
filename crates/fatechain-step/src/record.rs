use chrono::{DateTime, Utc};
use fatechain_core::{OperationId, ResourceId};
use serde::{Deserialize, Serialize};

use crate::error::{ChainError, StepError, UndoError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainStatus {
    /// Seeded, head step not yet executed.
    New,
    /// At least one step executed.
    InProgress,
    /// A step failed; the stack is being undone.
    FailedInProgress,
    /// Unwound after a failure.
    Failed,
    /// Finished; the stack is empty.
    Successful,
}

impl ChainStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Successful)
    }
}

/// How a successful chain ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The last step returned [`Next::Done`](crate::Next::Done).
    Completed,
    /// The target was already gone; nothing was done.
    Absent(ResourceId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoFailureRecord {
    pub step: String,
    pub description: String,
    pub message: String,
}

/// The failure that started an unwind, kept so a resumed unwind reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub step: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub undo_failures: Vec<UndoFailureRecord>,
}

impl FailureRecord {
    pub(crate) fn unknown() -> Self {
        Self {
            step: String::from("<unknown>"),
            message: String::from("failure not recorded"),
            undo_failures: Vec::new(),
        }
    }
}

/// Persisted state of one chain.
///
/// `stack` holds every step pushed so far: the first step at the bottom,
/// the current head on top. Undo walks it from the top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainRecord<S> {
    pub id: OperationId,
    pub status: ChainStatus,
    pub stack: Vec<S>,
    /// Consecutive not-ready polls of the current head.
    #[serde(default)]
    pub polls: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<S> ChainRecord<S> {
    #[must_use]
    pub fn new(id: OperationId, first: S) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: ChainStatus::New,
            stack: vec![first],
            polls: 0,
            failure: None,
            outcome: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Rebuild the error for a chain that failed in an earlier run.
    pub(crate) fn recorded_error(&self) -> ChainError {
        let failure = self.failure.clone().unwrap_or_else(FailureRecord::unknown);
        chain_error(self.id, failure, None, Vec::new())
    }
}

/// Combine a failure record with errors seen in this run.
///
/// `step_error` replaces the recorded message when the failure happened in
/// this process; `live_undo_errors` are the undo failures seen in this run,
/// which are also already appended to `failure.undo_failures`.
pub(crate) fn chain_error(
    operation: OperationId,
    failure: FailureRecord,
    step_error: Option<StepError>,
    live_undo_errors: Vec<UndoError>,
) -> ChainError {
    let step_error = step_error.unwrap_or_else(|| StepError::message(failure.message.clone()));
    let earlier = failure
        .undo_failures
        .len()
        .saturating_sub(live_undo_errors.len());
    let mut undo_errors: Vec<UndoError> = failure
        .undo_failures
        .into_iter()
        .take(earlier)
        .map(|recorded| UndoError {
            step: recorded.step,
            description: recorded.description,
            error: StepError::message(recorded.message),
        })
        .collect();
    undo_errors.extend(live_undo_errors);

    if undo_errors.is_empty() {
        ChainError::StepFailed {
            operation,
            step: failure.step,
            source: step_error,
        }
    } else {
        ChainError::UndoFailed {
            operation,
            failed_step: failure.step,
            step_error,
            undo_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_single_step_and_new_status() {
        let record = ChainRecord::new(OperationId::new(1), "first");

        assert_eq!(record.status, ChainStatus::New);
        assert_eq!(record.stack, vec!["first"]);
        assert_eq!(record.polls, 0);
        assert!(record.failure.is_none());
    }

    #[test]
    fn terminal_statuses() {
        assert!(ChainStatus::Failed.is_terminal());
        assert!(ChainStatus::Successful.is_terminal());
        assert!(!ChainStatus::New.is_terminal());
        assert!(!ChainStatus::InProgress.is_terminal());
        assert!(!ChainStatus::FailedInProgress.is_terminal());
    }

    #[test]
    fn recorded_error_without_undo_failures_is_step_failed() {
        let mut record = ChainRecord::new(OperationId::new(1), ());
        record.failure = Some(FailureRecord {
            step: "cleanup".to_string(),
            message: "boom".to_string(),
            undo_failures: Vec::new(),
        });

        let err = record.recorded_error();

        assert!(matches!(err, ChainError::StepFailed { ref step, .. } if step == "cleanup"));
    }

    #[test]
    fn recorded_error_with_undo_failures_is_undo_failed() {
        let mut record = ChainRecord::new(OperationId::new(1), ());
        record.failure = Some(FailureRecord {
            step: "cleanup".to_string(),
            message: "boom".to_string(),
            undo_failures: vec![UndoFailureRecord {
                step: "acquire".to_string(),
                description: "release".to_string(),
                message: "stuck".to_string(),
            }],
        });

        let err = record.recorded_error();

        assert_eq!(err.undo_errors().len(), 1);
        assert_eq!(err.undo_errors()[0].step, "acquire");
    }

    #[test]
    fn live_undo_errors_are_not_duplicated() {
        let failure = FailureRecord {
            step: "cleanup".to_string(),
            message: "boom".to_string(),
            undo_failures: vec![
                UndoFailureRecord {
                    step: "earlier".to_string(),
                    description: "d".to_string(),
                    message: "from a previous run".to_string(),
                },
                UndoFailureRecord {
                    step: "live".to_string(),
                    description: "d".to_string(),
                    message: "this run".to_string(),
                },
            ],
        };
        let live = vec![UndoError {
            step: "live".to_string(),
            description: "d".to_string(),
            error: StepError::message("this run"),
        }];

        let err = chain_error(OperationId::new(1), failure, None, live);

        let steps: Vec<_> = err.undo_errors().iter().map(|e| e.step.as_str()).collect();
        assert_eq!(steps, vec!["earlier", "live"]);
    }

    #[test]
    fn outcome_serializes_in_snake_case() {
        let json = serde_json::to_string(&Outcome::Absent(ResourceId::new("ns1")))
            .expect("serialize");

        assert_eq!(json, r#"{"absent":"ns1"}"#);
    }
}
