use std::time::Duration;

use fatechain_core::OperationId;

use crate::error::StepError;

/// How long the executor should wait before polling a step again.
///
/// [`WaitHint::READY`] (zero) means the step may execute now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct WaitHint(Duration);

impl WaitHint {
    pub const READY: Self = Self(Duration::ZERO);

    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    #[must_use]
    pub fn is_ready(self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn as_duration(self) -> Duration {
        self.0
    }
}

impl From<Duration> for WaitHint {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

/// What a step hands back to the executor after a successful `execute`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next<S> {
    /// Push this step and run it next.
    Step(S),
    /// The operation is complete.
    Done,
}

/// One unit of a multi-step operation.
///
/// A step holds only the data it needs to resume after being reloaded from a
/// store. Reservations and other holds are never kept in the step value; they
/// are re-acquired by [`is_ready`](Step::is_ready) on every call, so the
/// executor may call `is_ready` and `execute` again after a crash.
///
/// # Type Parameters
///
/// - `Env`: environment handle giving access to the reservation table,
///   notifier and whatever else the step touches
/// - `Chain`: the persisted step type the chain is made of; a chain's step
///   enum sets `Chain = Self`, and the structs it wraps name the enum
pub trait Step: Send + Sync {
    /// Environment handle passed to every call.
    type Env;

    /// Step type stored in the chain.
    type Chain;

    /// Human-readable name for logging and error messages.
    fn name(&self) -> &'static str;

    /// Acquire whatever this step needs before it can run.
    ///
    /// Returns [`WaitHint::READY`] to proceed, or a positive hint to be
    /// polled again later. Re-acquiring holds already owned by `op` is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// [`StepError::ReservationConflict`] when another operation holds an
    /// incompatible reservation, [`StepError::ResourceAbsent`] when the
    /// target no longer exists, or [`StepError::Failed`] for anything else.
    fn is_ready(&self, op: OperationId, env: &Self::Env) -> Result<WaitHint, StepError>;

    /// Perform the step's effect and name the step that follows.
    ///
    /// Must tolerate being run again if the executor crashed before recording
    /// the result.
    ///
    /// # Errors
    ///
    /// Any error is fatal to the chain and starts an unwind.
    fn execute(&self, op: OperationId, env: &Self::Env) -> Result<Next<Self::Chain>, StepError>;

    /// Reverse this step's effect.
    ///
    /// Called during unwinding, newest step first. Must be idempotent and a
    /// no-op when nothing was acquired. The default implementation does
    /// nothing, suitable for steps that hold nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the effect could not be reversed.
    fn undo(&self, op: OperationId, env: &Self::Env) -> Result<(), StepError> {
        let _ = (op, env);
        Ok(())
    }

    /// Human-readable description of what `undo` will do.
    fn undo_description(&self) -> String {
        format!("undo {}", self.name())
    }
}
