use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A board post. `content` is rich text and may embed stored image paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub profile_id: i64,
    pub category_id: i64,
    pub title: String,
    pub content: String,
    /// Pinned to the top of its board when set.
    pub top_active: bool,
    pub created_at: DateTime<Utc>,
}
