use models::{identity::new_id, time::now_timestamp, Comment, User};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{actor::Actor, errors::ServiceError, posts::author_info, storage::Storage};

/// A comment enriched for display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_nick: String,
    pub author_image: String,
    pub can_delete: bool,
}

/// Enrich `comments` in stored order.
pub(crate) fn build_views(comments: Vec<Comment>, users: &[User], viewer: Option<&Actor>) -> Vec<CommentView> {
    comments
        .into_iter()
        .map(|mut comment| {
            for key in ["author_nick", "author_image", "can_delete"] {
                comment.extra.remove(key);
            }
            let (author_nick, author_image) = author_info(users, &comment.author_id);
            let can_delete = comment.deletable_by(viewer.map(|v| v.user_id.as_str()), viewer.is_some_and(|v| v.is_admin));
            CommentView { comment, author_nick, author_image, can_delete }
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct CommentService {
    storage: Storage,
}

impl CommentService {
    pub fn new(storage: Storage) -> Self { Self { storage } }

    /// Comment on an existing post. Blank text is rejected.
    ///
    /// The post is checked again after the append, so a comment racing a
    /// post delete is dropped instead of left orphaned.
    #[instrument(skip(self, actor, text), fields(user_id = %actor.user_id))]
    pub async fn add(&self, actor: &Actor, post_id: &str, text: &str) -> Result<Comment, ServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::Validation("comment text is empty".into()));
        }
        if !self.post_exists(post_id).await? {
            return Err(ServiceError::not_found("post"));
        }

        let comment = Comment {
            id: new_id(),
            post_id: post_id.to_string(),
            author_id: actor.user_id.clone(),
            text: text.to_string(),
            created_at: now_timestamp(),
            extra: Default::default(),
        };
        self.storage.comments.append(comment.clone()).await?;
        if self.discard_if_orphaned(&comment).await? {
            return Err(ServiceError::not_found("post"));
        }
        info!(comment_id = %comment.id, "comment_added");
        Ok(comment)
    }

    async fn post_exists(&self, post_id: &str) -> Result<bool, ServiceError> {
        Ok(self.storage.posts.try_read_all().await?.iter().any(|p| p.id == post_id))
    }

    /// Remove `comment` again when its post no longer exists. Returns whether it was removed.
    async fn discard_if_orphaned(&self, comment: &Comment) -> Result<bool, ServiceError> {
        if self.post_exists(&comment.post_id).await? {
            return Ok(false);
        }
        self.storage
            .comments
            .update(|comments| {
                comments.retain(|c| c.id != comment.id);
                Ok(())
            })
            .await?;
        warn!(comment_id = %comment.id, post_id = %comment.post_id, "post vanished while commenting; comment dropped");
        Ok(true)
    }

    pub async fn list_for_post(&self, post_id: &str, viewer: Option<&Actor>) -> Vec<CommentView> {
        let comments: Vec<Comment> = self
            .storage
            .comments
            .read_all()
            .await
            .into_iter()
            .filter(|c| c.post_id == post_id)
            .collect();
        let users = self.storage.users.read_all().await;
        build_views(comments, &users, viewer)
    }

    /// Author or admin only.
    pub async fn delete(&self, actor: &Actor, comment_id: &str) -> Result<(), ServiceError> {
        self.storage
            .comments
            .update(|comments| {
                let idx = comments
                    .iter()
                    .position(|c| c.id == comment_id)
                    .ok_or_else(|| ServiceError::not_found("comment"))?;
                if !comments[idx].deletable_by(Some(actor.user_id.as_str()), actor.is_admin) {
                    return Err(ServiceError::forbidden("delete this comment"));
                }
                comments.remove(idx);
                Ok(())
            })
            .await?;
        info!(%comment_id, by = %actor.user_id, "comment_deleted");
        Ok(())
    }
}
