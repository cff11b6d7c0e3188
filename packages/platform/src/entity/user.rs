use serde::{Deserialize, Serialize};

/// A site account. Authored content hangs off a [`Profile`], not the
/// account itself.
///
/// [`Profile`]: super::Profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique login name; also the subject identifier in staging keys.
    pub username: String,
    pub email: Option<String>,
    pub apt_id: i64,
}
