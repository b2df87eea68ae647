use std::path::PathBuf;

use fatechain_ops::OperationError;
use fatechain_ops::traits::CatalogError;
use fatechain_reserve::ReservationError;
use fatechain_step::{ChainError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Reservation(#[from] ReservationError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("failed to open chain store")]
    Store(#[from] StoreError),

    #[error("failed to read config '{path}'")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{path}'")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{failed} of {total} namespace delete(s) failed")]
    DeleteFailed { failed: usize, total: usize },

    #[error("{0} resumed chain(s) failed")]
    ResumeFailed(usize),
}

pub type Result<T> = std::result::Result<T, CliError>;
