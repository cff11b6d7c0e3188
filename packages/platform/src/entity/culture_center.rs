use serde::{Deserialize, Serialize};

/// A culture-center event hosted by an apartment complex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CultureCenter {
    pub id: i64,
    pub apt_id: i64,
    pub center_type: i32,
}
