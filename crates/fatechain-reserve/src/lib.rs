//! Reservations on named resources.
//!
//! A reservation is a shared or exclusive hold on a [`ResourceId`], tagged by
//! the [`OperationId`] that owns it. Per resource there is at most one
//! exclusive holder, or any number of shared holders and no exclusive one.
//! Re-acquiring a hold the operation already owns is a no-op, and releasing
//! is idempotent, so steps can call both on every retry.
//!
//! [`ResourceId`]: fatechain_core::ResourceId
//! [`OperationId`]: fatechain_core::OperationId

mod error;
mod provider;
mod table;

pub use error::ReservationError;
pub use provider::ReservationProvider;
pub use table::{Reservation, ReservationTable};
