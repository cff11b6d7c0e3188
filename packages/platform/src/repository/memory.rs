use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::entity::{
    Article, ArticleTag, ChatMessage, ChatRoom, ChatRoomUser, Comment, CultureCenter, Lesson,
    LessonUser, Love, Profile, Tag, User,
};
use crate::error::AppError;

use super::{
    ArticleRepository, ArticleTagRepository, ChatMessageRepository, ChatRoomRepository,
    ChatRoomUserRepository, CommentRepository, CultureCenterRepository, LessonRepository,
    LessonUserRepository, LoveRepository, ProfileRepository, TagRepository, UserRepository,
};

/// Every table held by the in-memory store. Cloned out by
/// [`MemoryStore::snapshot`] so tests can assert on row counts directly.
#[derive(Debug, Default, Clone)]
pub struct Tables {
    pub users: Vec<User>,
    pub profiles: Vec<Profile>,
    pub articles: Vec<Article>,
    pub comments: Vec<Comment>,
    pub loves: Vec<Love>,
    pub tags: Vec<Tag>,
    pub article_tags: Vec<ArticleTag>,
    pub lessons: Vec<Lesson>,
    pub lesson_users: Vec<LessonUser>,
    pub centers: Vec<CultureCenter>,
    pub chat_rooms: Vec<ChatRoom>,
    pub chat_room_users: Vec<ChatRoomUser>,
    pub chat_messages: Vec<ChatMessage>,
}

/// In-memory implementation of every repository seam.
///
/// Backs the integration tests and doubles as a storage-engine-free default
/// for embedding.
pub struct MemoryStore {
    tables: RwLock<Tables>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            next_id: AtomicI64::new(1),
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub async fn snapshot(&self) -> Tables {
        self.tables.read().await.clone()
    }

    pub async fn add_user(&self, username: &str, apt_id: i64) -> User {
        let user = User {
            username: username.to_string(),
            email: None,
            apt_id,
        };
        self.tables.write().await.users.push(user.clone());
        user
    }

    pub async fn add_profile(&self, username: &str, name: &str) -> Profile {
        let profile = Profile {
            id: self.next_id(),
            username: username.to_string(),
            name: name.to_string(),
        };
        self.tables.write().await.profiles.push(profile.clone());
        profile
    }

    pub async fn add_article(&self, profile_id: i64, title: &str, content: &str) -> Article {
        let article = Article {
            id: self.next_id(),
            profile_id,
            category_id: 1,
            title: title.to_string(),
            content: content.to_string(),
            top_active: false,
            created_at: Utc::now(),
        };
        self.tables.write().await.articles.push(article.clone());
        article
    }

    pub async fn add_comment(
        &self,
        article_id: i64,
        profile_id: i64,
        parent_id: Option<i64>,
        content: &str,
    ) -> Comment {
        let comment = Comment {
            id: self.next_id(),
            article_id,
            profile_id,
            parent_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.tables.write().await.comments.push(comment.clone());
        comment
    }

    pub async fn add_love(&self, article_id: i64, profile_id: i64) -> Love {
        let love = Love {
            id: self.next_id(),
            article_id,
            profile_id,
        };
        self.tables.write().await.loves.push(love.clone());
        love
    }

    /// Link `article_id` to the named tag, creating the tag on first use.
    pub async fn tag_article(&self, article_id: i64, name: &str) -> ArticleTag {
        let tag_id = {
            let tables = self.tables.read().await;
            tables.tags.iter().find(|t| t.name == name).map(|t| t.id)
        };
        let tag_id = match tag_id {
            Some(id) => id,
            None => {
                let tag = Tag {
                    id: self.next_id(),
                    name: name.to_string(),
                };
                let id = tag.id;
                self.tables.write().await.tags.push(tag);
                id
            }
        };
        let link = ArticleTag {
            id: self.next_id(),
            article_id,
            tag_id,
        };
        self.tables.write().await.article_tags.push(link.clone());
        link
    }

    pub async fn add_center(&self, apt_id: i64, center_type: i32) -> CultureCenter {
        let center = CultureCenter {
            id: self.next_id(),
            apt_id,
            center_type,
        };
        self.tables.write().await.centers.push(center.clone());
        center
    }

    pub async fn add_lesson(&self, center_id: i64, profile_id: i64, name: &str, content: &str) -> Lesson {
        let lesson = Lesson {
            id: self.next_id(),
            center_id,
            profile_id,
            name: name.to_string(),
            content: content.to_string(),
        };
        self.tables.write().await.lessons.push(lesson.clone());
        lesson
    }

    pub async fn enroll(&self, lesson_id: i64, profile_id: i64) -> LessonUser {
        let enrollment = LessonUser {
            id: self.next_id(),
            lesson_id,
            profile_id,
        };
        self.tables.write().await.lesson_users.push(enrollment.clone());
        enrollment
    }

    pub async fn add_chat_room(&self, title: &str) -> ChatRoom {
        let room = ChatRoom {
            id: self.next_id(),
            title: title.to_string(),
        };
        self.tables.write().await.chat_rooms.push(room.clone());
        room
    }

    pub async fn join_room(&self, room_id: i64, profile_id: i64) -> ChatRoomUser {
        let membership = ChatRoomUser {
            id: self.next_id(),
            room_id,
            profile_id,
        };
        self.tables.write().await.chat_room_users.push(membership.clone());
        membership
    }

    pub async fn add_message(&self, room_id: i64, profile_id: i64, content: &str) -> ChatMessage {
        let message = ChatMessage {
            id: self.next_id(),
            room_id,
            profile_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.tables.write().await.chat_messages.push(message.clone());
        message
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn remove_by_id<T>(rows: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
    let before = rows.len();
    rows.retain(|row| !matches(row));
    rows.len() < before
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn delete(&self, username: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.users, |u| u.username == username))
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Profile>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Vec<Profile>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .iter()
            .filter(|p| p.username == username)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.profiles, |p| p.id == id))
    }
}

#[async_trait]
impl ArticleRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Article>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.articles.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_profile(&self, profile_id: i64) -> Result<Vec<Article>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .articles
            .iter()
            .filter(|a| a.profile_id == profile_id)
            .cloned()
            .collect())
    }

    async fn update_content(&self, id: i64, content: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        match tables.articles.iter_mut().find(|a| a.id == id) {
            Some(article) => {
                article.content = content.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.articles, |a| a.id == id))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn find_by_article(&self, article_id: i64) -> Result<Vec<Comment>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect())
    }

    async fn find_by_profile(&self, profile_id: i64) -> Result<Vec<Comment>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.profile_id == profile_id)
            .cloned()
            .collect())
    }

    async fn find_children(&self, parent_id: i64) -> Result<Vec<Comment>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.comments, |c| c.id == id))
    }
}

#[async_trait]
impl LoveRepository for MemoryStore {
    async fn find_by_article(&self, article_id: i64) -> Result<Vec<Love>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .loves
            .iter()
            .filter(|l| l.article_id == article_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.loves, |l| l.id == id))
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.tags, |t| t.id == id))
    }
}

#[async_trait]
impl ArticleTagRepository for MemoryStore {
    async fn find_by_article(&self, article_id: i64) -> Result<Vec<ArticleTag>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .article_tags
            .iter()
            .filter(|at| at.article_id == article_id)
            .cloned()
            .collect())
    }

    async fn find_by_tag(&self, tag_id: i64) -> Result<Vec<ArticleTag>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .article_tags
            .iter()
            .filter(|at| at.tag_id == tag_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.article_tags, |at| at.id == id))
    }
}

#[async_trait]
impl LessonRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Lesson>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.lessons.iter().find(|l| l.id == id).cloned())
    }

    async fn find_by_profile(&self, profile_id: i64) -> Result<Vec<Lesson>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .lessons
            .iter()
            .filter(|l| l.profile_id == profile_id)
            .cloned()
            .collect())
    }

    async fn update_content(&self, id: i64, content: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        match tables.lessons.iter_mut().find(|l| l.id == id) {
            Some(lesson) => {
                lesson.content = content.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.lessons, |l| l.id == id))
    }
}

#[async_trait]
impl LessonUserRepository for MemoryStore {
    async fn find_by_lesson(&self, lesson_id: i64) -> Result<Vec<LessonUser>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .lesson_users
            .iter()
            .filter(|lu| lu.lesson_id == lesson_id)
            .cloned()
            .collect())
    }

    async fn find_by_profile(&self, profile_id: i64) -> Result<Vec<LessonUser>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .lesson_users
            .iter()
            .filter(|lu| lu.profile_id == profile_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.lesson_users, |lu| lu.id == id))
    }
}

#[async_trait]
impl CultureCenterRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<CultureCenter>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.centers.iter().find(|c| c.id == id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.centers, |c| c.id == id))
    }
}

#[async_trait]
impl ChatRoomRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<ChatRoom>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.chat_rooms.iter().find(|r| r.id == id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.chat_rooms, |r| r.id == id))
    }
}

#[async_trait]
impl ChatRoomUserRepository for MemoryStore {
    async fn find_by_room(&self, room_id: i64) -> Result<Vec<ChatRoomUser>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .chat_room_users
            .iter()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn find_member(
        &self,
        room_id: i64,
        profile_id: i64,
    ) -> Result<Option<ChatRoomUser>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .chat_room_users
            .iter()
            .find(|m| m.room_id == room_id && m.profile_id == profile_id)
            .cloned())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.chat_room_users, |m| m.id == id))
    }
}

#[async_trait]
impl ChatMessageRepository for MemoryStore {
    async fn find_by_room(&self, room_id: i64) -> Result<Vec<ChatMessage>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .chat_messages
            .iter()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.chat_messages, |m| m.id == id))
    }
}
