//! Waste reports: creation, the enriched feed, likes and cascading deletion.

use std::collections::HashMap;

use models::{
    identity::new_id,
    media::{normalize_path, resolve_under},
    time::{now_timestamp, sort_most_recent_first},
    Comment, Post, User,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::{actor::Actor, errors::ServiceError, pagination::Pagination, storage::Storage};

/// Shown in place of an author whose account no longer exists.
pub const ANONYMOUS_NICK: &str = "Anônimo";

/// Keys computed at read time; stale copies on disk must not shadow them.
const DERIVED_KEYS: [&str; 5] = ["author_nick", "author_image", "comments_count", "likes_count", "user_liked"];

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewPost {
    pub description: String,
    pub address: String,
    pub tags: String,
    /// Stored upload path, e.g. `PlannedUpload::stored_path` from `UploadPolicy::post_image`.
    #[serde(default)]
    pub image_path: Option<String>,
}

/// Feed filters; both are case-insensitive substring matches.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PostFilter {
    /// Matches description, address or tags.
    pub q: Option<String>,
    pub tag: Option<String>,
}

/// A post enriched for display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub author_nick: String,
    pub author_image: String,
    pub comments_count: usize,
    pub likes_count: usize,
    pub user_liked: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeOutcome {
    pub likes_count: usize,
    pub liked: bool,
}

/// Nickname and image of `author_id`, or the anonymous placeholder.
pub(crate) fn author_info(users: &[User], author_id: &str) -> (String, String) {
    match users.iter().find(|u| u.id == author_id) {
        Some(u) => (u.nickname.clone(), u.profile_image_url()),
        None => (ANONYMOUS_NICK.to_string(), String::new()),
    }
}

fn build_view(mut post: Post, users: &[User], comments_count: usize, viewer: Option<&Actor>) -> PostView {
    for key in DERIVED_KEYS {
        post.extra.remove(key);
    }
    post.image_path = post.image_url();
    let (author_nick, author_image) = author_info(users, &post.author_id);
    let user_liked = viewer.is_some_and(|v| post.liked_by(&v.user_id));
    PostView {
        likes_count: post.likes.len(),
        post,
        author_nick,
        author_image,
        comments_count,
        user_liked,
    }
}

#[derive(Clone, Debug)]
pub struct PostService {
    storage: Storage,
}

impl PostService {
    pub fn new(storage: Storage) -> Self { Self { storage } }

    #[instrument(skip(self, actor, input), fields(author_id = %actor.user_id))]
    pub async fn create(&self, actor: &Actor, input: NewPost) -> Result<Post, ServiceError> {
        let post = Post {
            id: new_id(),
            author_id: actor.user_id.clone(),
            description: input.description.trim().to_string(),
            address: input.address.trim().to_string(),
            tags: input.tags.trim().to_string(),
            image_path: input.image_path.as_deref().map(normalize_path).unwrap_or_default(),
            created_at: now_timestamp(),
            likes: Vec::new(),
            extra: Default::default(),
        };
        self.storage.posts.append(post.clone()).await?;
        info!(post_id = %post.id, "post_created");
        Ok(post)
    }

    pub async fn get(&self, post_id: &str) -> Option<Post> {
        self.storage.posts.read_all().await.into_iter().find(|p| p.id == post_id)
    }

    /// One post with its comments, both enriched for `viewer`.
    pub async fn view(
        &self,
        post_id: &str,
        viewer: Option<&Actor>,
    ) -> Result<(PostView, Vec<crate::comments::CommentView>), ServiceError> {
        let post = self.get(post_id).await.ok_or_else(|| ServiceError::not_found("post"))?;
        let users = self.storage.users.read_all().await;
        let comments: Vec<Comment> = self
            .storage
            .comments
            .read_all()
            .await
            .into_iter()
            .filter(|c| c.post_id == post_id)
            .collect();
        let view = build_view(post, &users, comments.len(), viewer);
        let comment_views = crate::comments::build_views(comments, &users, viewer);
        Ok((view, comment_views))
    }

    /// Filtered posts, most recent first, enriched for `viewer`.
    pub async fn feed(&self, viewer: Option<&Actor>, filter: &PostFilter, page: Option<Pagination>) -> Vec<PostView> {
        let mut posts = self.storage.posts.read_all().await;
        let users = self.storage.users.read_all().await;
        let comments = self.storage.comments.read_all().await;

        let mut comment_counts: HashMap<&str, usize> = HashMap::new();
        for c in &comments {
            *comment_counts.entry(c.post_id.as_str()).or_default() += 1;
        }

        if let Some(q) = filter.q.as_deref().map(|q| q.trim().to_lowercase()).filter(|q| !q.is_empty()) {
            posts.retain(|p| p.matches_query(&q));
        }
        if let Some(tag) = filter.tag.as_deref().map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty()) {
            posts.retain(|p| p.matches_tag(&tag));
        }
        sort_most_recent_first(&mut posts, |p| p.created_at.as_str());
        if let Some(page) = page {
            posts = page.apply(posts);
        }

        posts
            .into_iter()
            .map(|p| {
                let count = comment_counts.get(p.id.as_str()).copied().unwrap_or(0);
                build_view(p, &users, count, viewer)
            })
            .collect()
    }

    /// Like or unlike `post_id` as `actor`.
    pub async fn toggle_like(&self, actor: &Actor, post_id: &str) -> Result<LikeOutcome, ServiceError> {
        let outcome = self
            .storage
            .posts
            .update(|posts| {
                let post = posts
                    .iter_mut()
                    .find(|p| p.id == post_id)
                    .ok_or_else(|| ServiceError::not_found("post"))?;
                let liked = post.toggle_like(&actor.user_id);
                Ok(LikeOutcome { likes_count: post.likes.len(), liked })
            })
            .await?;
        info!(%post_id, user_id = %actor.user_id, liked = outcome.liked, "post_like_toggled");
        Ok(outcome)
    }

    /// Delete a post with its comments and image file. Author or admin only.
    ///
    /// The post row goes first. If the comment cascade then fails the post
    /// stays deleted and the error is [`ServiceError::CascadeFailed`]. The
    /// image file is removed last in every case.
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn delete(&self, actor: &Actor, post_id: &str) -> Result<(), ServiceError> {
        let post = self
            .storage
            .posts
            .update(|posts| {
                let idx = posts
                    .iter()
                    .position(|p| p.id == post_id)
                    .ok_or_else(|| ServiceError::not_found("post"))?;
                if !actor.can_manage(&posts[idx].author_id) {
                    return Err(ServiceError::forbidden("delete this post"));
                }
                Ok(posts.remove(idx))
            })
            .await?;

        let cascade = self
            .storage
            .comments
            .update(|comments| {
                let before = comments.len();
                comments.retain(|c| c.post_id != post_id);
                Ok(before - comments.len())
            })
            .await;
        self.remove_image(&post).await;

        match cascade {
            Ok(removed_comments) => {
                info!(%post_id, removed_comments, "post_deleted");
                Ok(())
            }
            Err(e) => {
                error!(%post_id, error = %e, "post deleted but its comments were left behind");
                Err(ServiceError::CascadeFailed {
                    entity: "post".into(),
                    collection: self.storage.comments.name().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Best effort: a missing or undeletable file never blocks the delete.
    async fn remove_image(&self, post: &Post) {
        if post.image_path.trim().is_empty() {
            return;
        }
        let Some(path) = resolve_under(self.storage.static_dir(), &post.image_path) else {
            warn!(post_id = %post.id, image_path = %post.image_path, "image path escapes static root; not removed");
            return;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(post_id = %post.id, path = %path.display(), error = %e, "removing post image failed"),
        }
    }
}
