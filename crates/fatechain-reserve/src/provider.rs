use fatechain_core::{LockMode, OperationId, ResourceId};

use crate::error::ReservationError;
use crate::table::Reservation;

/// Capability for holding named resources on behalf of an operation.
pub trait ReservationProvider: Send + Sync {
    /// Try to take a hold on `resource` for `operation`.
    ///
    /// Returns `Ok(true)` when the hold is granted or `operation` already owns
    /// it. When an incompatible hold belongs to another operation, returns
    /// `Ok(false)` if `wait` is set (the caller should poll again later) and
    /// a [`ReservationError::Conflict`] otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::Conflict`] when busy and `wait` is false, or
    /// [`ReservationError::Poisoned`] if the backing table is unusable.
    fn reserve(
        &self,
        resource: &ResourceId,
        operation: OperationId,
        mode: LockMode,
        wait: bool,
    ) -> Result<bool, ReservationError>;

    /// Release a hold. Releasing a hold that is not held is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::Poisoned`] if the backing table is unusable.
    fn unreserve(
        &self,
        resource: &ResourceId,
        operation: OperationId,
        mode: LockMode,
    ) -> Result<(), ReservationError>;

    /// Current holders of `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::Poisoned`] if the backing table is unusable.
    fn holders(&self, resource: &ResourceId) -> Result<Vec<Reservation>, ReservationError>;

    /// Every hold owned by `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::Poisoned`] if the backing table is unusable.
    fn held_by(&self, operation: OperationId) -> Result<Vec<Reservation>, ReservationError>;
}
