use serde::{Deserialize, Serialize};

use crate::Extra;

/// A waste report. `likes` holds user ids, each at most once.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub author_id: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub address: String,
    /// Free text, e.g. `"entulho, praia"`.
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub tags: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub image_path: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub likes: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Post {
    pub fn liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }

    /// Flip `user_id`'s like and return whether the post is now liked by them.
    pub fn toggle_like(&mut self, user_id: &str) -> bool {
        if self.liked_by(user_id) {
            self.likes.retain(|id| id != user_id);
            false
        } else {
            self.likes.push(user_id.to_string());
            true
        }
    }

    /// Case-insensitive substring match over description, address and tags.
    /// `needle` must already be lowercase.
    pub fn matches_query(&self, needle: &str) -> bool {
        [&self.description, &self.address, &self.tags]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }

    /// `needle` must already be lowercase.
    pub fn matches_tag(&self, needle: &str) -> bool {
        self.tags.to_lowercase().contains(needle)
    }

    pub fn image_url(&self) -> String {
        crate::media::normalize_path(&self.image_path)
    }
}
