mod error;
mod files;
mod index;
mod location;
mod snapshot;

pub use error::StorageError;
pub use files::FileStore;
pub use index::{FilesystemKeyIndexStore, KeyIndexEntry, KeyIndexStore};
pub use location::{BlobLocationStore, BlobRecord, FilesystemBlobLocationStore};
