use serde::{Deserialize, Serialize};

use crate::Extra;

/// A label an admin attached to a user. Duplicates are allowed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub user_id: String,
    pub tag: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub given_by: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub given_at: String,
    #[serde(flatten)]
    pub extra: Extra,
}
