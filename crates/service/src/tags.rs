//! Admin-given user labels.

use std::collections::BTreeMap;

use models::{time::now_timestamp, Tag};
use tracing::info;

use crate::{actor::Actor, errors::ServiceError, storage::Storage};

#[derive(Clone, Debug)]
pub struct TagService {
    storage: Storage,
}

impl TagService {
    pub fn new(storage: Storage) -> Self { Self { storage } }

    /// Label `user_id` with `tag`. Duplicate labels are kept.
    pub async fn give(&self, actor: &Actor, user_id: &str, tag: &str) -> Result<Tag, ServiceError> {
        actor.require_admin("tag users")?;
        let (user_id, tag) = (user_id.trim(), tag.trim());
        if user_id.is_empty() || tag.is_empty() {
            return Err(ServiceError::Validation("user and tag are required".into()));
        }
        if !self.storage.users.read_all().await.iter().any(|u| u.id == user_id) {
            return Err(ServiceError::not_found("user"));
        }
        let record = Tag {
            user_id: user_id.to_string(),
            tag: tag.to_string(),
            given_by: actor.user_id.clone(),
            given_at: now_timestamp(),
            extra: Default::default(),
        };
        self.storage.tags.append(record.clone()).await?;
        info!(%user_id, %tag, by = %actor.user_id, "tag_given");
        Ok(record)
    }

    /// Remove every `(user_id, tag)` pair; returns how many went.
    pub async fn remove(&self, actor: &Actor, user_id: &str, tag: &str) -> Result<usize, ServiceError> {
        actor.require_admin("remove tags")?;
        let removed = self
            .storage
            .tags
            .update(|tags| {
                let before = tags.len();
                tags.retain(|t| !(t.user_id == user_id && t.tag == tag));
                Ok(before - tags.len())
            })
            .await?;
        info!(%user_id, %tag, removed, "tag_removed");
        Ok(removed)
    }

    pub async fn for_user(&self, user_id: &str) -> Vec<Tag> {
        self.storage.tags.read_all().await.into_iter().filter(|t| t.user_id == user_id).collect()
    }

    /// Every tag grouped by the labelled user, in stored order within a group.
    pub async fn by_user(&self) -> BTreeMap<String, Vec<Tag>> {
        let mut grouped: BTreeMap<String, Vec<Tag>> = BTreeMap::new();
        for tag in self.storage.tags.read_all().await {
            grouped.entry(tag.user_id.clone()).or_default().push(tag);
        }
        grouped
    }
}
