//! Where uploaded images go and how large they may be.
//!
//! The web layer receives the multipart body; it asks this module for a
//! destination, writes the bytes there and hands `stored_path` on to
//! `ProfileUpdate` or `NewPost`.

use std::path::PathBuf;

use configs::LimitsConfig;
use models::media::{cover_image_path, post_image_path, profile_image_path, resolve_under};
use tracing::debug;

use crate::{errors::ServiceError, storage::Storage};

const MB: u64 = 1024 * 1024;

/// Destination for one accepted upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedUpload {
    /// Relative to the static root, `/`-separated; this is what records store.
    pub stored_path: String,
    pub disk_path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct UploadPolicy {
    storage: Storage,
    limits: LimitsConfig,
}

impl UploadPolicy {
    pub fn new(storage: Storage, limits: LimitsConfig) -> Self { Self { storage, limits } }

    /// Longest side, in pixels, images should be scaled down to.
    pub fn max_image_dim(&self) -> u32 {
        self.limits.max_image_dim
    }

    pub fn profile_image(&self, user_id: &str, filename: &str, size_bytes: u64) -> Result<PlannedUpload, ServiceError> {
        self.check(filename, size_bytes, self.limits.max_profile_mb)?;
        self.plan(profile_image_path(user_id, filename))
    }

    pub fn cover_image(&self, user_id: &str, filename: &str, size_bytes: u64) -> Result<PlannedUpload, ServiceError> {
        self.check(filename, size_bytes, self.limits.max_profile_mb)?;
        self.plan(cover_image_path(user_id, filename))
    }

    pub fn post_image(&self, author_id: &str, filename: &str, size_bytes: u64) -> Result<PlannedUpload, ServiceError> {
        self.check(filename, size_bytes, self.limits.max_image_mb)?;
        self.plan(post_image_path(author_id, filename))
    }

    fn check(&self, filename: &str, size_bytes: u64, max_mb: u32) -> Result<(), ServiceError> {
        if filename.trim().is_empty() || size_bytes == 0 {
            return Err(ServiceError::Validation("no file uploaded".into()));
        }
        if size_bytes > u64::from(max_mb) * MB {
            return Err(ServiceError::Validation(format!("file larger than {max_mb} MB")));
        }
        Ok(())
    }

    fn plan(&self, stored_path: String) -> Result<PlannedUpload, ServiceError> {
        let disk_path = resolve_under(self.storage.static_dir(), &stored_path)
            .ok_or_else(|| ServiceError::Validation("upload path escapes the static root".into()))?;
        debug!(%stored_path, "upload planned");
        Ok(PlannedUpload { stored_path, disk_path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cleanup, temp_storage};

    #[tokio::test]
    async fn sizes_are_checked_against_configured_limits() -> Result<(), anyhow::Error> {
        let (storage, root) = temp_storage().await?;
        let limits = LimitsConfig { max_profile_mb: 1, max_image_mb: 3, max_image_dim: 800 };
        let uploads = UploadPolicy::new(storage.clone(), limits);

        assert!(uploads.profile_image("u1", "me.png", MB).is_ok());
        assert!(matches!(uploads.profile_image("u1", "me.png", MB + 1), Err(ServiceError::Validation(_))));
        assert!(matches!(uploads.cover_image("u1", "bg.png", 2 * MB), Err(ServiceError::Validation(_))));
        assert!(uploads.post_image("u1", "lixo.jpg", 2 * MB).is_ok());
        assert!(matches!(uploads.post_image("u1", "", 10), Err(ServiceError::Validation(_))));
        assert!(matches!(uploads.post_image("u1", "lixo.jpg", 0), Err(ServiceError::Validation(_))));
        assert_eq!(uploads.max_image_dim(), 800);

        cleanup(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn planned_paths_land_under_the_static_root() -> Result<(), anyhow::Error> {
        let (storage, root) = temp_storage().await?;
        let uploads = UploadPolicy::new(storage.clone(), LimitsConfig::default());

        let profile = uploads.profile_image("u1", "Me.PNG", 10)?;
        assert_eq!(profile.stored_path, "uploads/profile/profile_u1.png");
        assert_eq!(profile.disk_path, storage.static_dir().join("uploads/profile/profile_u1.png"));

        let post = uploads.post_image("u1", "../../etc/passwd", 10)?;
        assert!(post.stored_path.starts_with("uploads/u1/posts/post_"));
        assert!(post.disk_path.starts_with(storage.static_dir()));

        cleanup(&root).await;
        Ok(())
    }
}
