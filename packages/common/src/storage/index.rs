use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::error::StorageError;
use super::snapshot;

/// One logical key mapped to its ordered list of value keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyIndexEntry {
    pub logical_key: String,
    pub value_keys: Vec<String>,
}

/// Persistent mapping from a composite logical key to an ordered list of
/// value keys, emulating a one-to-many relation in a key/value substrate.
///
/// Value keys are derived by the store as `<logicalKey>.<n>`, `n` being the
/// 0-based position at append time; callers never supply their own. The
/// derivation stays collision-free as long as an entry is only appended to.
#[async_trait]
pub trait KeyIndexStore: Send + Sync {
    async fn get(&self, logical_key: &str) -> Result<Option<KeyIndexEntry>, StorageError>;

    /// Create the entry for `logical_key`, seeded with its first derived
    /// value key (returned). Fails with `DuplicateKey` if an entry exists.
    async fn create(&self, logical_key: &str) -> Result<String, StorageError>;

    /// Append the next derived value key (returned). Fails with `NotFound`
    /// if the entry does not exist.
    async fn append(&self, logical_key: &str) -> Result<String, StorageError>;

    /// Create on first use, append otherwise.
    async fn push(&self, logical_key: &str) -> Result<String, StorageError> {
        match self.append(logical_key).await {
            Err(StorageError::NotFound(_)) => self.create(logical_key).await,
            other => other,
        }
    }

    /// Remove a single value key; the entry is dropped once emptied.
    /// Returns whether the value key was present.
    async fn remove_value(&self, logical_key: &str, value_key: &str)
    -> Result<bool, StorageError>;

    /// Returns whether an entry existed.
    async fn delete(&self, logical_key: &str) -> Result<bool, StorageError>;
}

fn derived_key(logical_key: &str, index: usize) -> String {
    format!("{logical_key}.{index}")
}

/// JSON-snapshot-backed [`KeyIndexStore`]. The whole mapping is held in
/// memory and rewritten atomically (temp file + rename) after each mutation.
pub struct FilesystemKeyIndexStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, Vec<String>>>,
}

impl FilesystemKeyIndexStore {
    pub async fn open(path: PathBuf) -> Result<Self, StorageError> {
        let entries = snapshot::load(&path).await?;
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }
}

#[async_trait]
impl KeyIndexStore for FilesystemKeyIndexStore {
    async fn get(&self, logical_key: &str) -> Result<Option<KeyIndexEntry>, StorageError> {
        let entries = self.entries.read().await;
        Ok(entries.get(logical_key).map(|value_keys| KeyIndexEntry {
            logical_key: logical_key.to_string(),
            value_keys: value_keys.clone(),
        }))
    }

    async fn create(&self, logical_key: &str) -> Result<String, StorageError> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(logical_key) {
            return Err(StorageError::DuplicateKey(logical_key.to_string()));
        }
        let first = derived_key(logical_key, 0);
        entries.insert(logical_key.to_string(), vec![first.clone()]);
        snapshot::save(&self.path, &*entries).await?;
        Ok(first)
    }

    async fn append(&self, logical_key: &str) -> Result<String, StorageError> {
        let mut entries = self.entries.write().await;
        let Some(value_keys) = entries.get_mut(logical_key) else {
            return Err(StorageError::NotFound(logical_key.to_string()));
        };
        let next = derived_key(logical_key, value_keys.len());
        value_keys.push(next.clone());
        snapshot::save(&self.path, &*entries).await?;
        Ok(next)
    }

    async fn remove_value(
        &self,
        logical_key: &str,
        value_key: &str,
    ) -> Result<bool, StorageError> {
        let mut entries = self.entries.write().await;
        let Some(value_keys) = entries.get_mut(logical_key) else {
            return Ok(false);
        };
        let Some(pos) = value_keys.iter().position(|v| v == value_key) else {
            return Ok(false);
        };
        value_keys.remove(pos);
        if value_keys.is_empty() {
            entries.remove(logical_key);
        }
        snapshot::save(&self.path, &*entries).await?;
        Ok(true)
    }

    async fn delete(&self, logical_key: &str) -> Result<bool, StorageError> {
        let mut entries = self.entries.write().await;
        if entries.remove(logical_key).is_none() {
            return Ok(false);
        }
        snapshot::save(&self.path, &*entries).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> (FilesystemKeyIndexStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemKeyIndexStore::open(dir.path().join("key_index.json"))
            .await
            .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn create_seeds_first_derived_key() {
        let (store, _dir) = temp_store().await;
        let first = store.create("TEMP.alice.5").await.unwrap();
        assert_eq!(first, "TEMP.alice.5.0");

        let entry = store.get("TEMP.alice.5").await.unwrap().unwrap();
        assert_eq!(entry.value_keys, vec!["TEMP.alice.5.0"]);
    }

    #[tokio::test]
    async fn append_derives_positional_keys() {
        let (store, _dir) = temp_store().await;
        store.create("ARTICLE.42").await.unwrap();
        assert_eq!(store.append("ARTICLE.42").await.unwrap(), "ARTICLE.42.1");
        assert_eq!(store.append("ARTICLE.42").await.unwrap(), "ARTICLE.42.2");

        let entry = store.get("ARTICLE.42").await.unwrap().unwrap();
        assert_eq!(
            entry.value_keys,
            vec!["ARTICLE.42.0", "ARTICLE.42.1", "ARTICLE.42.2"]
        );
    }

    #[tokio::test]
    async fn create_rejects_duplicates() {
        let (store, _dir) = temp_store().await;
        store.create("APT.7").await.unwrap();
        assert!(matches!(
            store.create("APT.7").await,
            Err(StorageError::DuplicateKey(_))
        ));
    }

    #[tokio::test]
    async fn append_requires_existing_entry() {
        let (store, _dir) = temp_store().await;
        assert!(matches!(
            store.append("CENTER.9").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn push_creates_then_appends() {
        let (store, _dir) = temp_store().await;
        assert_eq!(store.push("LESSON.3").await.unwrap(), "LESSON.3.0");
        assert_eq!(store.push("LESSON.3").await.unwrap(), "LESSON.3.1");
    }

    #[tokio::test]
    async fn remove_value_drops_emptied_entry() {
        let (store, _dir) = temp_store().await;
        store.create("ARTICLE.1").await.unwrap();
        store.append("ARTICLE.1").await.unwrap();

        assert!(store.remove_value("ARTICLE.1", "ARTICLE.1.0").await.unwrap());
        let entry = store.get("ARTICLE.1").await.unwrap().unwrap();
        assert_eq!(entry.value_keys, vec!["ARTICLE.1.1"]);

        assert!(store.remove_value("ARTICLE.1", "ARTICLE.1.1").await.unwrap());
        assert!(store.get("ARTICLE.1").await.unwrap().is_none());

        assert!(!store.remove_value("ARTICLE.1", "ARTICLE.1.0").await.unwrap());
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let (store, _dir) = temp_store().await;
        store.create("USER.bob.2").await.unwrap();
        assert!(store.delete("USER.bob.2").await.unwrap());
        assert!(!store.delete("USER.bob.2").await.unwrap());
    }

    #[tokio::test]
    async fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key_index.json");

        let store = FilesystemKeyIndexStore::open(path.clone()).await.unwrap();
        store.create("ARTICLE.42").await.unwrap();
        store.append("ARTICLE.42").await.unwrap();
        drop(store);

        let reopened = FilesystemKeyIndexStore::open(path).await.unwrap();
        let entry = reopened.get("ARTICLE.42").await.unwrap().unwrap();
        assert_eq!(entry.value_keys, vec!["ARTICLE.42.0", "ARTICLE.42.1"]);
    }
}
