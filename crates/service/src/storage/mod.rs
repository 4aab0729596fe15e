//! Flat-file persistence.
//!
//! `CollectionStore` persists one JSON array per collection; `BanList` is the
//! CSV-backed ban collection. `Storage` opens every collection the application
//! uses from `configs::StorageConfig` and is cloned into each service.

pub mod ban_list;
pub mod collection_store;

use std::path::{Path, PathBuf};

use configs::StorageConfig;
use models::{CollectionPoint, Comment, Post, Tag, User};
use tracing::info;

use crate::errors::ServiceError;
pub use ban_list::BanList;
pub use collection_store::CollectionStore;

#[derive(Clone, Debug)]
pub struct Storage {
    pub users: CollectionStore<User>,
    pub posts: CollectionStore<Post>,
    pub comments: CollectionStore<Comment>,
    pub tags: CollectionStore<Tag>,
    pub collection_points: CollectionStore<CollectionPoint>,
    pub bans: BanList,
    static_dir: PathBuf,
}

impl Storage {
    /// Bind every collection to its file without touching the disk.
    pub fn new(cfg: &StorageConfig) -> Self {
        Self {
            users: CollectionStore::new("users", cfg.users_path()),
            posts: CollectionStore::new("posts", cfg.posts_path()),
            comments: CollectionStore::new("comments", cfg.comments_path()),
            tags: CollectionStore::new("tags", cfg.tags_path()),
            collection_points: CollectionStore::new("collection_points", cfg.collection_points_path()),
            bans: BanList::new(cfg.banned_path()),
            static_dir: PathBuf::from(&cfg.static_dir),
        }
    }

    /// `new` followed by `ensure_all`.
    pub async fn open(cfg: &StorageConfig) -> Result<Self, ServiceError> {
        let storage = Self::new(cfg);
        storage.ensure_all().await?;
        Ok(storage)
    }

    /// Create any missing collection file. Existing data is left alone.
    pub async fn ensure_all(&self) -> Result<(), ServiceError> {
        self.users.ensure().await?;
        self.posts.ensure().await?;
        self.comments.ensure().await?;
        self.tags.ensure().await?;
        self.collection_points.ensure().await?;
        self.bans.ensure().await?;
        info!(data_dir = %self.data_dir().display(), "collections ready");
        Ok(())
    }

    /// Root that stored upload paths are relative to.
    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    fn data_dir(&self) -> &Path {
        self.users.path().parent().unwrap_or_else(|| Path::new("."))
    }
}
