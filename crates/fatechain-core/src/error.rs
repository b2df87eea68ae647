use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("invalid operation id '{0}': expected 'op-' followed by up to 16 hex digits")]
    InvalidOperationId(String),
}

pub type Result<T> = std::result::Result<T, IdError>;
