use serde::{Deserialize, Serialize};

/// A chat room; lives only as long as it has members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: i64,
    pub title: String,
}
