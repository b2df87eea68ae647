use fatechain_core::{LockMode, OperationId, ResourceId};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReservationError {
    #[error("cannot reserve '{resource}' ({requested}): held by {holder}")]
    Conflict {
        resource: ResourceId,
        requested: LockMode,
        holder: OperationId,
    },

    #[error("reservation table lock poisoned")]
    Poisoned,
}
