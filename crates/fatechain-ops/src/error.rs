use std::path::PathBuf;

use fatechain_reserve::ReservationError;
use fatechain_step::ChainError;
use thiserror::Error;

use crate::traits::CatalogError;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Reservation(#[from] ReservationError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("namespace '{0}' is protected and cannot be deleted")]
    ProtectedNamespace(String),

    #[error("failed to read cluster state '{path}'")]
    StateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse cluster state '{path}'")]
    StateParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize cluster state for '{path}'")]
    StateSerialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write cluster state '{path}'")]
    StateWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, OperationError>;
