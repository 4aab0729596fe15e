//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::{info, warn};

/// Ensure the data and upload directories exist; warn when the static root is missing.
pub async fn ensure_env(static_dir: &str, data_dir: &str, upload_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(static_dir).await.is_err() {
        warn!(%static_dir, "static directory not found; it will be created for uploads");
    }
    for dir in [data_dir, upload_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {dir}: {e}"))?;
    }
    info!(%data_dir, %upload_dir, "runtime directories ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_directories() -> Result<(), anyhow::Error> {
        let root = std::env::temp_dir().join(format!("sos_env_{}", uuid::Uuid::new_v4()));
        let data = root.join("data");
        let uploads = root.join("static").join("uploads");
        ensure_env(
            &root.join("static").to_string_lossy(),
            &data.to_string_lossy(),
            &uploads.to_string_lossy(),
        )
        .await?;
        assert!(data.is_dir());
        assert!(uploads.is_dir());
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }
}
