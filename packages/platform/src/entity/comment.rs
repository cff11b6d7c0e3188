use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment on an article; replies form a tree via `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub article_id: i64,
    pub profile_id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
