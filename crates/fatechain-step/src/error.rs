use std::error::Error as StdError;

use fatechain_core::{OperationId, ResourceId};
use thiserror::Error;

use crate::store::StoreError;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Error raised by a step's `is_ready`, `execute` or `undo`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StepError {
    /// Another operation holds an incompatible reservation.
    #[error("resource '{resource}' is reserved by {holder}")]
    ReservationConflict {
        resource: ResourceId,
        holder: OperationId,
    },

    /// The target resource no longer exists. Not a failure: there is nothing
    /// left to do.
    #[error("resource '{0}' does not exist")]
    ResourceAbsent(ResourceId),

    /// Anything else. Fatal to the chain.
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl StepError {
    /// A failure with context and the error that caused it.
    pub fn failed(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Failed {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// A failure with no underlying error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            source: None,
        }
    }
}

/// A step whose `undo` failed during unwinding.
#[derive(Debug, Error)]
#[error("undo failed for step '{step}': {description}")]
pub struct UndoError {
    /// Name of the step whose undo failed.
    pub step: String,
    /// Description of what the undo was trying to do.
    pub description: String,
    /// The underlying error.
    #[source]
    pub error: StepError,
}

/// Error from driving a chain.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChainError {
    /// A step failed and every undo succeeded.
    #[error("operation {operation}: step '{step}' failed")]
    StepFailed {
        operation: OperationId,
        step: String,
        #[source]
        source: StepError,
    },

    /// A step failed and some undos also failed. Holds may be stuck.
    #[error(
        "operation {operation}: step '{failed_step}' failed, and {} undo(s) also failed",
        undo_errors.len()
    )]
    UndoFailed {
        operation: OperationId,
        failed_step: String,
        step_error: StepError,
        undo_errors: Vec<UndoError>,
    },

    #[error("operation {0} is still running")]
    Active(OperationId),

    #[error("executor thread for operation {0} panicked")]
    Panicked(OperationId),

    #[error("chain store error")]
    Store(#[from] StoreError),
}

impl ChainError {
    /// Undo failures carried by this error, if any.
    #[must_use]
    pub fn undo_errors(&self) -> &[UndoError] {
        match self {
            Self::UndoFailed { undo_errors, .. } => undo_errors,
            _ => &[],
        }
    }
}
