use std::fmt;

/// Errors that can occur in the index and blob-location stores.
#[derive(Debug)]
pub enum StorageError {
    /// The requested entry, record, or file was not found.
    NotFound(String),
    /// An entry already exists for the logical key.
    DuplicateKey(String),
    /// A persisted snapshot could not be parsed.
    Corrupt(String),
    /// An I/O error occurred.
    Io(std::io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "not found: {key}"),
            Self::DuplicateKey(key) => write!(f, "duplicate key: {key}"),
            Self::Corrupt(msg) => write!(f, "corrupt snapshot: {msg}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
