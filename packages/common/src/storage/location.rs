use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::error::StorageError;
use super::snapshot;

/// System-of-record for where a stored blob lives on disk.
///
/// `relative_path` is resolved against the configured storage root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRecord {
    pub value_key: String,
    pub relative_path: String,
}

/// Persistent mapping from a value key to a relative filesystem path.
///
/// The store does not validate that the path exists on disk; callers own
/// that invariant.
#[async_trait]
pub trait BlobLocationStore: Send + Sync {
    async fn get(&self, value_key: &str) -> Result<Option<BlobRecord>, StorageError>;

    /// Upsert the record for `value_key`.
    async fn put(&self, value_key: &str, relative_path: &str)
    -> Result<BlobRecord, StorageError>;

    /// Returns whether a record existed.
    async fn delete(&self, value_key: &str) -> Result<bool, StorageError>;
}

/// JSON-snapshot-backed [`BlobLocationStore`], same persistence scheme as
/// the key index.
pub struct FilesystemBlobLocationStore {
    path: PathBuf,
    records: RwLock<BTreeMap<String, String>>,
}

impl FilesystemBlobLocationStore {
    pub async fn open(path: PathBuf) -> Result<Self, StorageError> {
        let records = snapshot::load(&path).await?;
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }
}

#[async_trait]
impl BlobLocationStore for FilesystemBlobLocationStore {
    async fn get(&self, value_key: &str) -> Result<Option<BlobRecord>, StorageError> {
        let records = self.records.read().await;
        Ok(records.get(value_key).map(|relative_path| BlobRecord {
            value_key: value_key.to_string(),
            relative_path: relative_path.clone(),
        }))
    }

    async fn put(
        &self,
        value_key: &str,
        relative_path: &str,
    ) -> Result<BlobRecord, StorageError> {
        let mut records = self.records.write().await;
        records.insert(value_key.to_string(), relative_path.to_string());
        snapshot::save(&self.path, &*records).await?;
        Ok(BlobRecord {
            value_key: value_key.to_string(),
            relative_path: relative_path.to_string(),
        })
    }

    async fn delete(&self, value_key: &str) -> Result<bool, StorageError> {
        let mut records = self.records.write().await;
        if records.remove(value_key).is_none() {
            return Ok(false);
        }
        snapshot::save(&self.path, &*records).await?;
        Ok(true)
    }
}
