use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use super::error::StorageError;

/// Rooted filesystem operations for the upload, promotion, and cascade
/// paths.
///
/// Paths handed in are the relative (`/api/...`) form kept in the
/// blob-location store; every call resolves them against a single storage
/// root, which is never removed or escaped.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create the store, creating the root directory if missing.
    pub async fn new(root: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for a stored relative path.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative.trim_start_matches('/'))
    }

    /// Write `data`, creating parent directories on demand.
    pub async fn write(&self, relative: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, data).await?;
        Ok(())
    }

    pub async fn exists(&self, relative: &str) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.resolve(relative)).await?)
    }

    /// Move a file into `dest_dir_rel`, keeping its file name, and prune the
    /// emptied source directory. Returns the new relative path.
    ///
    /// Re-runs are tolerated: a missing source with the destination already
    /// in place counts as success.
    pub async fn move_into_dir(
        &self,
        src_rel: &str,
        dest_dir_rel: &str,
    ) -> Result<String, StorageError> {
        let file_name = src_rel
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| StorageError::NotFound(src_rel.to_string()))?;
        let new_rel = if dest_dir_rel.ends_with('/') {
            format!("{dest_dir_rel}{file_name}")
        } else {
            format!("{dest_dir_rel}/{file_name}")
        };

        let src = self.resolve(src_rel);
        let dest = self.resolve(&new_rel);

        if !fs::try_exists(&src).await? {
            if fs::try_exists(&dest).await? {
                debug!(src_rel, new_rel = %new_rel, "source already moved");
                return Ok(new_rel);
            }
            return Err(StorageError::NotFound(src_rel.to_string()));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::rename(&src, &dest).await?;

        if let Some(parent) = src.parent() {
            self.prune_if_empty(parent).await?;
        }

        Ok(new_rel)
    }

    /// Remove a file; a missing file is `false`, not an error.
    pub async fn remove_file(&self, relative: &str) -> Result<bool, StorageError> {
        match fs::remove_file(self.resolve(relative)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a file and prune its parent directory if that left it empty.
    pub async fn remove_file_pruning(&self, relative: &str) -> Result<bool, StorageError> {
        let removed = self.remove_file(relative).await?;
        if let Some(parent) = self.resolve(relative).parent() {
            self.prune_if_empty(parent).await?;
        }
        Ok(removed)
    }

    /// Recursively remove the directory holding `relative`.
    ///
    /// Permanently homed files live in a directory owned by a single
    /// entity, so the cascade removes the whole directory at once.
    pub async fn remove_parent_dir(&self, relative: &str) -> Result<(), StorageError> {
        let path = self.resolve(relative);
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        if parent == self.root {
            // A stray top-level file never takes the root down with it.
            self.remove_file(relative).await?;
            return Ok(());
        }
        match fs::remove_dir_all(parent).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn prune_if_empty(&self, dir: &Path) -> Result<(), StorageError> {
        if dir == self.root {
            return Ok(());
        }
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        if entries.next_entry().await?.is_none() {
            match fs::remove_dir(dir).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
