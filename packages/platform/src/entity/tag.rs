use serde::{Deserialize, Serialize};

/// A tag, shared across articles and reference-counted through
/// [`ArticleTag`] rows: a tag whose last link is removed is garbage.
///
/// [`ArticleTag`]: super::ArticleTag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}
