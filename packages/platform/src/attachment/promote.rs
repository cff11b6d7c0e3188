use std::sync::Arc;

use common::storage::{BlobLocationStore, FileStore, KeyIndexStore};
use tracing::{debug, instrument, warn};

use crate::error::AppError;
use crate::repository::{ArticleRepository, LessonRepository};

use super::key::{ImageKey, Owner, Subject};
use super::staging::ImageRef;

/// Re-homes staged blobs to permanent, owner-keyed locations.
#[derive(Clone)]
pub struct AttachmentPromoter {
    files: Arc<FileStore>,
    index: Arc<dyn KeyIndexStore>,
    locations: Arc<dyn BlobLocationStore>,
    articles: Arc<dyn ArticleRepository>,
    lessons: Arc<dyn LessonRepository>,
}

impl AttachmentPromoter {
    pub fn new(
        files: Arc<FileStore>,
        index: Arc<dyn KeyIndexStore>,
        locations: Arc<dyn BlobLocationStore>,
        articles: Arc<dyn ArticleRepository>,
        lessons: Arc<dyn LessonRepository>,
    ) -> Self {
        Self {
            files,
            index,
            locations,
            articles,
            lessons,
        }
    }

    /// Move everything staged in the subject's list slot under the owner's
    /// permanent key, merging into an existing entry, and rewrite inline
    /// references in the owner's body for rich-text owners.
    ///
    /// Returns the owner's attachments after promotion. An empty staging
    /// slot means nothing to promote, so re-running is a no-op. A
    /// filesystem move failure aborts that blob's step and propagates;
    /// already-promoted blobs are not rolled back.
    #[instrument(
        skip(self, subject, owner),
        fields(subject = %subject.suffix(), owner = %owner.logical_key())
    )]
    pub async fn promote(
        &self,
        subject: &Subject,
        owner: Owner,
    ) -> Result<Vec<ImageRef>, AppError> {
        let staging_key = subject.temp_key();
        let Some(staged) = self.index.get(&staging_key).await? else {
            debug!("nothing staged");
            return self.list_attachments(owner).await;
        };

        let mut moves: Vec<(String, String)> = Vec::new();
        for value_key in &staged.value_keys {
            let Some(record) = self.locations.get(value_key).await? else {
                warn!(%value_key, "staged record missing, skipping");
                continue;
            };
            let new_path = self
                .files
                .move_into_dir(&record.relative_path, &owner.dir())
                .await?;
            self.locations.delete(value_key).await?;
            let permanent_key = self.index.push(&owner.logical_key()).await?;
            self.locations.put(&permanent_key, &new_path).await?;
            moves.push((record.relative_path, new_path));
        }
        self.index.delete(&staging_key).await?;

        match owner.scope {
            ImageKey::Article => self.rewrite_article(owner.id, &moves).await?,
            ImageKey::Lesson => self.rewrite_lesson(owner.id, &moves).await?,
            _ => {}
        }

        self.list_attachments(owner).await
    }

    /// Promote the subject's single staged upload to its permanent profile
    /// location under `USER.<username>.<profileId>`, replacing any existing
    /// profile image. An empty slot yields `None`.
    #[instrument(skip(self, subject), fields(subject = %subject.suffix()))]
    pub async fn promote_profile_image(
        &self,
        subject: &Subject,
        profile_id: i64,
    ) -> Result<Option<ImageRef>, AppError> {
        let staging_key = subject.temp_key();
        let Some(staged) = self.locations.get(&staging_key).await? else {
            return Ok(None);
        };

        let permanent_key = ImageKey::User.key(&format!("{}.{profile_id}", subject.username));
        if let Some(previous) = self.locations.get(&permanent_key).await? {
            self.files.remove_file(&previous.relative_path).await?;
        }

        let new_path = self
            .files
            .move_into_dir(&staged.relative_path, &subject.profile_image_dir(profile_id))
            .await?;
        self.locations.delete(&staging_key).await?;
        let record = self.locations.put(&permanent_key, &new_path).await?;

        Ok(Some(ImageRef {
            key: record.value_key,
            path: record.relative_path,
        }))
    }

    /// The owner's attachments, in promotion order.
    pub async fn list_attachments(&self, owner: Owner) -> Result<Vec<ImageRef>, AppError> {
        let Some(entry) = self.index.get(&owner.logical_key()).await? else {
            return Ok(Vec::new());
        };
        let mut attachments = Vec::new();
        for value_key in &entry.value_keys {
            if let Some(record) = self.locations.get(value_key).await? {
                attachments.push(ImageRef {
                    key: record.value_key,
                    path: record.relative_path,
                });
            }
        }
        Ok(attachments)
    }

    /// The promoted profile image for a profile, if any.
    pub async fn profile_image(
        &self,
        username: &str,
        profile_id: i64,
    ) -> Result<Option<ImageRef>, AppError> {
        let key = ImageKey::User.key(&format!("{username}.{profile_id}"));
        Ok(self.locations.get(&key).await?.map(|record| ImageRef {
            key: record.value_key,
            path: record.relative_path,
        }))
    }

    /// Delete a single stored blob: its file (pruning an emptied
    /// directory), its record, and its slot in a list entry when the value
    /// key was list-derived.
    #[instrument(skip(self))]
    pub async fn delete_blob(&self, value_key: &str) -> Result<(), AppError> {
        let Some(record) = self.locations.get(value_key).await? else {
            return Err(AppError::NotFound(format!("blob {value_key}")));
        };
        self.files.remove_file_pruning(&record.relative_path).await?;
        self.locations.delete(value_key).await?;

        // Bare single-file keys can look list-derived; removal is a no-op
        // when no entry exists for the prefix.
        if let Some((logical_key, suffix)) = value_key.rsplit_once('.')
            && suffix.parse::<usize>().is_ok()
        {
            self.index.remove_value(logical_key, value_key).await?;
        }
        Ok(())
    }

    async fn rewrite_article(
        &self,
        id: i64,
        moves: &[(String, String)],
    ) -> Result<(), AppError> {
        if moves.is_empty() {
            return Ok(());
        }
        let article = self
            .articles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("article {id}")))?;
        let content = rewrite_references(&article.content, moves);
        self.articles.update_content(id, &content).await?;
        Ok(())
    }

    async fn rewrite_lesson(&self, id: i64, moves: &[(String, String)]) -> Result<(), AppError> {
        if moves.is_empty() {
            return Ok(());
        }
        let lesson = self
            .lessons
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("lesson {id}")))?;
        let content = rewrite_references(&lesson.content, moves);
        self.lessons.update_content(id, &content).await?;
        Ok(())
    }
}

/// Replace every embedded occurrence of a moved path with its new home.
fn rewrite_references(content: &str, moves: &[(String, String)]) -> String {
    let mut rewritten = content.to_string();
    for (old, new) in moves {
        rewritten = rewritten.replace(old.as_str(), new);
    }
    rewritten
}
