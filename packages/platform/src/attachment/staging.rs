use std::sync::Arc;

use common::storage::{BlobLocationStore, FileStore, KeyIndexStore};
use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::AppError;

use super::key::Subject;

/// An uploaded blob: declared content type plus raw bytes.
#[derive(Debug, Clone)]
pub struct Upload {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A stored image reference handed back to the caller layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub key: String,
    pub path: String,
}

/// Derive the stored file extension from the declared content type.
///
/// The extension is the subtype (`image/png` stores as `.png`); the type
/// must be well-formed and known, otherwise the upload is rejected.
pub(crate) fn extension_for(content_type: &str) -> Result<&str, AppError> {
    let known = mime_guess::get_mime_extensions_str(content_type).is_some();
    let subtype = content_type
        .split_once('/')
        .map(|(_, subtype)| subtype)
        .filter(|subtype| !subtype.is_empty());
    match subtype {
        Some(subtype) if known => Ok(subtype),
        _ => Err(AppError::InvalidUpload(format!(
            "unsupported content type '{content_type}'"
        ))),
    }
}

/// Accepts uploads for a subject before their owning record exists.
///
/// One staging slot per subject: the single-file slot keeps only the most
/// recent unpromoted upload, the list slot accumulates uploads in order.
#[derive(Clone)]
pub struct StagingManager {
    files: Arc<FileStore>,
    index: Arc<dyn KeyIndexStore>,
    locations: Arc<dyn BlobLocationStore>,
    max_upload_size: u64,
}

impl StagingManager {
    pub fn new(
        files: Arc<FileStore>,
        index: Arc<dyn KeyIndexStore>,
        locations: Arc<dyn BlobLocationStore>,
        max_upload_size: u64,
    ) -> Self {
        Self {
            files,
            index,
            locations,
            max_upload_size,
        }
    }

    fn validate<'a>(&self, upload: &'a Upload) -> Result<&'a str, AppError> {
        if upload.data.is_empty() {
            return Err(AppError::InvalidUpload("empty upload".into()));
        }
        if upload.data.len() as u64 > self.max_upload_size {
            return Err(AppError::InvalidUpload(format!(
                "upload exceeds maximum size of {} bytes",
                self.max_upload_size
            )));
        }
        extension_for(&upload.content_type)
    }

    /// Stage an upload into the subject's single-file slot.
    ///
    /// The slot is a bare key-to-path association, no index entry involved;
    /// a previously staged blob is deleted first so only the most recent
    /// unpromoted upload survives.
    #[instrument(skip(self, subject, upload), fields(subject = %subject.suffix()))]
    pub async fn stage_upload(
        &self,
        subject: &Subject,
        upload: &Upload,
    ) -> Result<ImageRef, AppError> {
        let ext = self.validate(upload)?;
        let key = subject.temp_key();

        if let Some(previous) = self.locations.get(&key).await? {
            debug!(path = %previous.relative_path, "replacing staged upload");
            self.files.remove_file_pruning(&previous.relative_path).await?;
            self.locations.delete(&key).await?;
        }

        let path = format!("{}{}.{}", subject.temp_dir(), Uuid::new_v4(), ext);
        self.files.write(&path, &upload.data).await?;
        let record = self.locations.put(&key, &path).await?;

        Ok(ImageRef {
            key: record.value_key,
            path: record.relative_path,
        })
    }

    /// Stage an upload into the subject's list slot and return everything
    /// accumulated there, in upload order.
    #[instrument(skip(self, subject, upload), fields(subject = %subject.suffix()))]
    pub async fn stage_upload_to_list(
        &self,
        subject: &Subject,
        upload: &Upload,
    ) -> Result<Vec<ImageRef>, AppError> {
        let ext = self.validate(upload)?;

        let path = format!("{}{}.{}", subject.temp_list_dir(), Uuid::new_v4(), ext);
        self.files.write(&path, &upload.data).await?;

        let value_key = self.index.push(&subject.temp_key()).await?;
        self.locations.put(&value_key, &path).await?;

        self.staged(subject).await
    }

    /// Everything currently staged in the subject's list slot. Records
    /// missing from the location store are skipped, not errors.
    pub async fn staged(&self, subject: &Subject) -> Result<Vec<ImageRef>, AppError> {
        let Some(entry) = self.index.get(&subject.temp_key()).await? else {
            return Ok(Vec::new());
        };
        let mut staged = Vec::new();
        for value_key in &entry.value_keys {
            if let Some(record) = self.locations.get(value_key).await? {
                staged.push(ImageRef {
                    key: record.value_key,
                    path: record.relative_path,
                });
            }
        }
        Ok(staged)
    }

    /// Drop every staged list upload for the subject: files, records, and
    /// the index entry.
    #[instrument(skip(self, subject), fields(subject = %subject.suffix()))]
    pub async fn discard(&self, subject: &Subject) -> Result<(), AppError> {
        let key = subject.temp_key();
        let Some(entry) = self.index.get(&key).await? else {
            return Ok(());
        };
        for value_key in &entry.value_keys {
            if let Some(record) = self.locations.get(value_key).await? {
                self.files.remove_file_pruning(&record.relative_path).await?;
                self.locations.delete(value_key).await?;
            }
        }
        self.index.delete(&key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_the_content_subtype() {
        assert_eq!(extension_for("image/png").unwrap(), "png");
        assert_eq!(extension_for("image/jpeg").unwrap(), "jpeg");
        assert_eq!(extension_for("application/pdf").unwrap(), "pdf");
    }

    #[test]
    fn unknown_or_malformed_content_types_are_rejected() {
        assert!(matches!(
            extension_for("application/x-made-up-type"),
            Err(AppError::InvalidUpload(_))
        ));
        assert!(matches!(
            extension_for("not-a-mime-type"),
            Err(AppError::InvalidUpload(_))
        ));
        assert!(matches!(
            extension_for("image/"),
            Err(AppError::InvalidUpload(_))
        ));
    }
}
