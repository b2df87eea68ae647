mod error;
pub mod config;
pub mod environment;
pub mod events;
pub mod operations;
pub mod providers;
pub mod traits;

#[cfg(test)]
pub mod mocks;

pub use error::{OperationError, Result};
