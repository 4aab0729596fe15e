use serde::{Deserialize, Serialize};

use crate::Extra;

/// Registered account. `email` and `nickname` are unique ignoring case.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub password_hash: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub nickname: String,
    /// Display name, stored under the `nome` key.
    #[serde(default, rename = "nome", deserialize_with = "crate::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub is_admin: bool,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub is_dev: bool,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub profile_image: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub cover_image: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub created_at: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl User {
    pub fn has_email(&self, email: &str) -> bool {
        crate::identity::same_identity(&self.email, email)
    }

    pub fn has_nickname(&self, nickname: &str) -> bool {
        crate::identity::same_identity(&self.nickname, nickname)
    }

    /// Profile image path with forward slashes, empty when unset.
    pub fn profile_image_url(&self) -> String {
        crate::media::normalize_path(&self.profile_image)
    }
}
