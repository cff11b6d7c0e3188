use serde::{Deserialize, Serialize};

/// A like on an article, at most one per profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Love {
    pub id: i64,
    pub article_id: i64,
    pub profile_id: i64,
}
