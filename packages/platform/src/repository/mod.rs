//! Repository seams for the plain-CRUD layer.
//!
//! The lifecycle core only ever needs the lookups and deletes below; full
//! CRUD for these tables lives in the surrounding application. Deletes
//! return whether a row existed so cascades can treat an already-gone row
//! as satisfied.

mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::entity::{
    Article, ArticleTag, ChatMessage, ChatRoom, ChatRoomUser, Comment, CultureCenter, Lesson,
    LessonUser, Love, Profile, User,
};
use crate::error::AppError;

pub use memory::{MemoryStore, Tables};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn delete(&self, username: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Profile>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Vec<Profile>, AppError>;
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Article>, AppError>;
    async fn find_by_profile(&self, profile_id: i64) -> Result<Vec<Article>, AppError>;
    async fn update_content(&self, id: i64, content: &str) -> Result<bool, AppError>;
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_article(&self, article_id: i64) -> Result<Vec<Comment>, AppError>;
    async fn find_by_profile(&self, profile_id: i64) -> Result<Vec<Comment>, AppError>;
    async fn find_children(&self, parent_id: i64) -> Result<Vec<Comment>, AppError>;
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait LoveRepository: Send + Sync {
    async fn find_by_article(&self, article_id: i64) -> Result<Vec<Love>, AppError>;
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ArticleTagRepository: Send + Sync {
    async fn find_by_article(&self, article_id: i64) -> Result<Vec<ArticleTag>, AppError>;
    async fn find_by_tag(&self, tag_id: i64) -> Result<Vec<ArticleTag>, AppError>;
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait LessonRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Lesson>, AppError>;
    async fn find_by_profile(&self, profile_id: i64) -> Result<Vec<Lesson>, AppError>;
    async fn update_content(&self, id: i64, content: &str) -> Result<bool, AppError>;
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait LessonUserRepository: Send + Sync {
    async fn find_by_lesson(&self, lesson_id: i64) -> Result<Vec<LessonUser>, AppError>;
    async fn find_by_profile(&self, profile_id: i64) -> Result<Vec<LessonUser>, AppError>;
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait CultureCenterRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<CultureCenter>, AppError>;
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ChatRoomRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<ChatRoom>, AppError>;
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ChatRoomUserRepository: Send + Sync {
    async fn find_by_room(&self, room_id: i64) -> Result<Vec<ChatRoomUser>, AppError>;
    async fn find_member(
        &self,
        room_id: i64,
        profile_id: i64,
    ) -> Result<Option<ChatRoomUser>, AppError>;
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ChatMessageRepository: Send + Sync {
    async fn find_by_room(&self, room_id: i64) -> Result<Vec<ChatMessage>, AppError>;
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

/// Shared handles to every repository the lifecycle core touches.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub articles: Arc<dyn ArticleRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub loves: Arc<dyn LoveRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub article_tags: Arc<dyn ArticleTagRepository>,
    pub lessons: Arc<dyn LessonRepository>,
    pub lesson_users: Arc<dyn LessonUserRepository>,
    pub centers: Arc<dyn CultureCenterRepository>,
    pub chat_rooms: Arc<dyn ChatRoomRepository>,
    pub chat_room_users: Arc<dyn ChatRoomUserRepository>,
    pub chat_messages: Arc<dyn ChatMessageRepository>,
}

impl Repositories {
    /// Wire every repository to a single in-memory store.
    pub fn in_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            profiles: store.clone(),
            articles: store.clone(),
            comments: store.clone(),
            loves: store.clone(),
            tags: store.clone(),
            article_tags: store.clone(),
            lessons: store.clone(),
            lesson_users: store.clone(),
            centers: store.clone(),
            chat_rooms: store.clone(),
            chat_room_users: store.clone(),
            chat_messages: store,
        }
    }
}
