use serde::{Deserialize, Serialize};

/// A profile's enrollment in a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonUser {
    pub id: i64,
    pub lesson_id: i64,
    pub profile_id: i64,
}
