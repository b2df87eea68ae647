//! Durable storage for chain records.

mod file;
mod memory;

use std::path::PathBuf;

use fatechain_core::OperationId;
use thiserror::Error;

use crate::record::ChainRecord;

pub use file::FileChainStore;
pub use memory::MemoryChainStore;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("operation {0} not found")]
    NotFound(OperationId),

    #[error("failed to read chain file '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write chain file '{path}'")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse chain file '{path}'")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize operation {operation}")]
    Serialize {
        operation: OperationId,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to list chains in '{path}'")]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("chain store lock poisoned")]
    Poisoned,
}

/// Where chains live between steps.
///
/// Every executor transition ends with a `save`, so a store that survives a
/// process restart lets a new executor resume every unfinished chain.
pub trait ChainStore<S>: Send + Sync {
    /// Allocate a new operation id and store a chain holding only `first`.
    ///
    /// # Errors
    ///
    /// Returns an error if the chain cannot be stored.
    fn create(&self, first: S) -> Result<OperationId, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or a storage error.
    fn load(&self, id: OperationId) -> Result<ChainRecord<S>, StoreError>;

    /// Replace the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn save(&self, record: &ChainRecord<S>) -> Result<(), StoreError>;

    /// Remove a chain. Removing an unknown id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the record exists but cannot be removed.
    fn remove(&self, id: OperationId) -> Result<(), StoreError>;

    /// Ids of every stored chain, ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be enumerated.
    fn list(&self) -> Result<Vec<OperationId>, StoreError>;
}
