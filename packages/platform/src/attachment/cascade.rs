use std::sync::Arc;

use common::storage::{BlobLocationStore, FileStore, KeyIndexStore};
use tracing::{debug, instrument};

use crate::error::AppError;
use crate::repository::Repositories;

use super::key::{ImageKey, Owner, Subject};
use super::staging::StagingManager;

/// A deletable attachment owner.
#[derive(Debug, Clone)]
pub enum OwnerRef {
    User(String),
    Profile(i64),
    Article(i64),
    Lesson(i64),
    Center(i64),
}

/// Destroys an owner and everything that semantically depends on it.
///
/// Ordering invariant: children are fully deleted before their parent row,
/// and an entity's files and index rows are removed before the entity row.
/// Already-deleted child rows count as satisfied, so a partially completed
/// cascade can safely re-run.
#[derive(Clone)]
pub struct CascadeDeleter {
    files: Arc<FileStore>,
    index: Arc<dyn KeyIndexStore>,
    locations: Arc<dyn BlobLocationStore>,
    staging: StagingManager,
    repos: Repositories,
}

impl CascadeDeleter {
    pub fn new(
        files: Arc<FileStore>,
        index: Arc<dyn KeyIndexStore>,
        locations: Arc<dyn BlobLocationStore>,
        staging: StagingManager,
        repos: Repositories,
    ) -> Self {
        Self {
            files,
            index,
            locations,
            staging,
            repos,
        }
    }

    /// Dispatch to the owner-specific deletion plan.
    pub async fn delete_owner(&self, owner: OwnerRef) -> Result<(), AppError> {
        match owner {
            OwnerRef::User(username) => self.delete_user(&username).await,
            OwnerRef::Profile(id) => self.delete_profile(id).await,
            OwnerRef::Article(id) => self.delete_article(id).await,
            OwnerRef::Lesson(id) => self.delete_lesson(id).await,
            OwnerRef::Center(id) => self.delete_center(id).await,
        }
    }

    /// Delete an account: every profile via the profile plan, then the
    /// user row.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, username: &str) -> Result<(), AppError> {
        if self.repos.users.find(username).await?.is_none() {
            return Err(AppError::NotFound(format!("user {username}")));
        }
        for profile in self.repos.profiles.find_by_username(username).await? {
            self.delete_profile(profile.id).await?;
        }
        self.repos.users.delete(username).await?;
        Ok(())
    }

    /// Delete a profile: authored articles, remaining authored comments,
    /// lesson enrollments, owned lessons, the profile's attachments and
    /// staging slots, then the profile row.
    #[instrument(skip(self))]
    pub async fn delete_profile(&self, profile_id: i64) -> Result<(), AppError> {
        let profile = self
            .repos
            .profiles
            .find_by_id(profile_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {profile_id}")))?;

        for article in self.repos.articles.find_by_profile(profile_id).await? {
            self.delete_article(article.id).await?;
        }
        // Comments on other authors' articles; anything already removed via
        // an article cascade above is a no-op here.
        for comment in self.repos.comments.find_by_profile(profile_id).await? {
            self.delete_comment_tree(comment.id).await?;
        }
        for enrollment in self.repos.lesson_users.find_by_profile(profile_id).await? {
            self.repos.lesson_users.delete(enrollment.id).await?;
        }
        for lesson in self.repos.lessons.find_by_profile(profile_id).await? {
            self.delete_lesson(lesson.id).await?;
        }

        let subject = Subject::profile(profile.username.clone(), profile.id);
        self.delete_single_attachment(&ImageKey::User.key(&subject.suffix()))
            .await?;
        self.delete_single_attachment(&subject.temp_key()).await?;
        self.staging.discard(&subject).await?;

        self.repos.profiles.delete(profile_id).await?;
        Ok(())
    }

    /// Delete an article: comment trees, loves, tag links (collecting
    /// orphaned tags), its attachment files and index rows, then the
    /// article row.
    #[instrument(skip(self))]
    pub async fn delete_article(&self, article_id: i64) -> Result<(), AppError> {
        if self.repos.articles.find_by_id(article_id).await?.is_none() {
            return Err(AppError::NotFound(format!("article {article_id}")));
        }

        for comment in self.repos.comments.find_by_article(article_id).await? {
            self.delete_comment_tree(comment.id).await?;
        }
        for love in self.repos.loves.find_by_article(article_id).await? {
            self.repos.loves.delete(love.id).await?;
        }
        for link in self.repos.article_tags.find_by_article(article_id).await? {
            let references = self.repos.article_tags.find_by_tag(link.tag_id).await?;
            if references.len() == 1 {
                // This link is the tag's last reference.
                self.repos.tags.delete(link.tag_id).await?;
            }
            self.repos.article_tags.delete(link.id).await?;
        }

        self.delete_indexed_attachments(Owner::article(article_id))
            .await?;
        self.repos.articles.delete(article_id).await?;
        Ok(())
    }

    /// Delete a comment and all of its descendants, deepest replies first.
    #[instrument(skip(self))]
    pub async fn delete_comment_tree(&self, comment_id: i64) -> Result<(), AppError> {
        // Gather the subtree with an explicit stack; reply threads can be
        // arbitrarily deep.
        let mut stack = vec![comment_id];
        let mut discovered = Vec::new();
        while let Some(id) = stack.pop() {
            discovered.push(id);
            for child in self.repos.comments.find_children(id).await? {
                stack.push(child.id);
            }
        }
        // Parents precede descendants in discovery order, so deleting in
        // reverse removes children first.
        for id in discovered.into_iter().rev() {
            self.repos.comments.delete(id).await?;
        }
        Ok(())
    }

    /// Delete a lesson: its enrollments, then the lesson row.
    #[instrument(skip(self))]
    pub async fn delete_lesson(&self, lesson_id: i64) -> Result<(), AppError> {
        if self.repos.lessons.find_by_id(lesson_id).await?.is_none() {
            return Err(AppError::NotFound(format!("lesson {lesson_id}")));
        }
        for enrollment in self.repos.lesson_users.find_by_lesson(lesson_id).await? {
            self.repos.lesson_users.delete(enrollment.id).await?;
        }
        // Lesson-scoped attachment entries are left as-is.
        self.repos.lessons.delete(lesson_id).await?;
        Ok(())
    }

    /// Delete a culture center: its attachment files and index rows, then
    /// the center row.
    #[instrument(skip(self))]
    pub async fn delete_center(&self, center_id: i64) -> Result<(), AppError> {
        if self.repos.centers.find_by_id(center_id).await?.is_none() {
            return Err(AppError::NotFound(format!("culture center {center_id}")));
        }
        self.delete_indexed_attachments(Owner::center(center_id))
            .await?;
        self.repos.centers.delete(center_id).await?;
        Ok(())
    }

    /// Remove a member from a chat room. The last member out takes the
    /// room's messages and the room itself with them.
    #[instrument(skip(self))]
    pub async fn leave_chat_room(&self, room_id: i64, profile_id: i64) -> Result<(), AppError> {
        if self.repos.chat_rooms.find_by_id(room_id).await?.is_none() {
            return Err(AppError::NotFound(format!("chat room {room_id}")));
        }
        let membership = self
            .repos
            .chat_room_users
            .find_member(room_id, profile_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("membership of profile {profile_id} in room {room_id}"))
            })?;
        self.repos.chat_room_users.delete(membership.id).await?;

        let remaining = self.repos.chat_room_users.find_by_room(room_id).await?;
        if remaining.is_empty() {
            debug!("last member left, removing room");
            for message in self.repos.chat_messages.find_by_room(room_id).await? {
                self.repos.chat_messages.delete(message.id).await?;
            }
            self.repos.chat_rooms.delete(room_id).await?;
        }
        Ok(())
    }

    /// Remove every blob of an indexed owner: each file's directory, each
    /// record, then the entry itself.
    async fn delete_indexed_attachments(&self, owner: Owner) -> Result<(), AppError> {
        let key = owner.logical_key();
        let Some(entry) = self.index.get(&key).await? else {
            return Ok(());
        };
        for value_key in &entry.value_keys {
            if let Some(record) = self.locations.get(value_key).await? {
                self.files.remove_parent_dir(&record.relative_path).await?;
                self.locations.delete(value_key).await?;
            }
        }
        self.index.delete(&key).await?;
        Ok(())
    }

    /// Remove a bare single-file attachment: the file's directory, then the
    /// record. Missing records are fine.
    async fn delete_single_attachment(&self, key: &str) -> Result<(), AppError> {
        if let Some(record) = self.locations.get(key).await? {
            self.files.remove_parent_dir(&record.relative_path).await?;
            self.locations.delete(key).await?;
        }
        Ok(())
    }
}
