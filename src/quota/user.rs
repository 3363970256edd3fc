use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::SwipeAllowance;

/// A stored user record.
///
/// Only the fields the quota needs are typed; everything else the record carries
/// is kept in `extra` so that saving a record never drops data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swipes: Option<SwipeAllowance>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            swipes: None,
            extra: Map::new(),
        }
    }

    pub fn with_swipes(mut self, swipes: SwipeAllowance) -> Self {
        self.swipes = Some(swipes);
        self
    }
}
