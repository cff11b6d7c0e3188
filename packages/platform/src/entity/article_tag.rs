use serde::{Deserialize, Serialize};

/// Link row between an article and a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleTag {
    pub id: i64,
    pub article_id: i64,
    pub tag_id: i64,
}
