use serde::{Deserialize, Serialize};

/// A lesson offered at a culture center. `content` is rich text and may
/// embed stored image paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub center_id: i64,
    /// The instructor's profile.
    pub profile_id: i64,
    pub name: String,
    pub content: String,
}
