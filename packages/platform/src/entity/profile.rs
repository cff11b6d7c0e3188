use serde::{Deserialize, Serialize};

/// A member profile. One account can hold several profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub name: String,
}
