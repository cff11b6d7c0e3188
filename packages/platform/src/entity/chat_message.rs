use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message posted to a chat room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub room_id: i64,
    pub profile_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
