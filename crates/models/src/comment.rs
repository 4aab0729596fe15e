use serde::{Deserialize, Serialize};

use crate::Extra;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub author_id: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub created_at: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Comment {
    /// Authors may delete their own comments; admins may delete any.
    pub fn deletable_by(&self, user_id: Option<&str>, is_admin: bool) -> bool {
        is_admin || user_id.is_some_and(|uid| uid == self.author_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deletion_rights() {
        let c = Comment { id: "c1".into(), post_id: "p1".into(), author_id: "u1".into(), ..Default::default() };
        assert!(c.deletable_by(Some("u1"), false));
        assert!(!c.deletable_by(Some("u2"), false));
        assert!(c.deletable_by(Some("u2"), true));
        assert!(!c.deletable_by(None, false));
    }
}
