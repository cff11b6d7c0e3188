use common::storage::StorageError;
use thiserror::Error;

/// Application-level error type for the attachment lifecycle core.
///
/// Authorization failures are raised by the surrounding service layer
/// before the core is reached and have no variant here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
