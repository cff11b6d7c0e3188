use serde::{Deserialize, Serialize};

/// Membership row linking a profile to a chat room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoomUser {
    pub id: i64,
    pub room_id: i64,
    pub profile_id: i64,
}
