use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;

use super::error::StorageError;

/// Read a JSON snapshot, defaulting when the file does not exist yet.
pub(crate) async fn load<T>(path: &Path) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::Corrupt(format!("{}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

/// Write a JSON snapshot to a sibling temp file, then rename into place.
pub(crate) async fn save<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension("tmp");
    if let Err(e) = fs::write(&tmp, &bytes).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    Ok(())
}
