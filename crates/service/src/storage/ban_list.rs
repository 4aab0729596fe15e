use std::{path::PathBuf, sync::Arc};

use models::{
    ban::{self, Ban, BAN_CSV_HEADER},
    identity::{normalize_email, same_identity},
    time::now_timestamp,
};
use tokio::{fs, sync::Mutex};
use tracing::{debug, info, warn};

use super::collection_store::temp_path;
use crate::errors::ServiceError;

/// CSV-backed ban collection (`email,ban_reason,ban_at`, no quoting).
///
/// Bans are keyed by email, not user id, so they outlive account deletion.
#[derive(Clone, Debug)]
pub struct BanList {
    file_path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl BanList {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into(), lock: Arc::new(Mutex::new(())) }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.file_path
    }

    /// Create the file with its header row if absent.
    pub async fn ensure(&self) -> Result<(), ServiceError> {
        let _guard = self.lock.lock().await;
        if fs::try_exists(&self.file_path).await.unwrap_or(false) {
            return Ok(());
        }
        self.save_locked(&[]).await
    }

    /// Header-skipping, case-insensitive email lookup. Unreadable files mean "not banned".
    pub async fn is_banned(&self, email: &str) -> bool {
        match self.read_lines().await {
            Ok(lines) => lines.iter().skip(1).any(|line| same_identity(ban::row_email(line), email)),
            Err(e) => {
                warn!(error = %e, "reading ban list failed");
                false
            }
        }
    }

    /// Record a ban. Returns `false` (and writes nothing) when `email` is already banned.
    pub async fn add_ban(&self, email: &str, reason: &str) -> Result<bool, ServiceError> {
        let email = normalize_email(email);
        let _guard = self.lock.lock().await;
        let lines = self.read_lines().await?;
        let data_rows: Vec<String> = lines.into_iter().skip(1).collect();
        if data_rows.iter().any(|line| same_identity(ban::row_email(line), &email)) {
            debug!(%email, "already banned");
            return Ok(false);
        }
        let ban = Ban { email: email.clone(), reason: reason.trim().to_string(), banned_at: now_timestamp() };
        let mut rows = data_rows;
        rows.push(ban.to_row());
        self.save_locked(&rows).await?;
        info!(%email, "ban_added");
        Ok(true)
    }

    /// Drop every row for `email`, keeping the header. Returns whether anything was removed.
    pub async fn remove_ban(&self, email: &str) -> Result<bool, ServiceError> {
        let _guard = self.lock.lock().await;
        if !fs::try_exists(&self.file_path).await.unwrap_or(false) {
            return Ok(false);
        }
        let lines = self.read_lines().await?;
        let before = lines.len().saturating_sub(1);
        let kept: Vec<String> = lines
            .into_iter()
            .skip(1)
            .filter(|line| !same_identity(ban::row_email(line), email))
            .collect();
        let removed = kept.len() != before;
        self.save_locked(&kept).await?;
        if removed {
            info!(email = %normalize_email(email), "ban_removed");
        }
        Ok(removed)
    }

    /// Every well-formed ban row; short rows are skipped.
    pub async fn list_bans(&self) -> Vec<Ban> {
        match self.read_lines().await {
            Ok(lines) => lines.iter().skip(1).filter_map(|line| Ban::parse_row(line)).collect(),
            Err(e) => {
                warn!(error = %e, "reading ban list failed");
                Vec::new()
            }
        }
    }

    /// Raw lines including the header; a missing file has none.
    async fn read_lines(&self) -> Result<Vec<String>, ServiceError> {
        match fs::read_to_string(&self.file_path).await {
            Ok(content) => Ok(content.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(ServiceError::Io(format!("{}: {}", self.file_path.display(), e))),
        }
    }

    /// Rewrite as header plus `rows`. Existing rows are written back verbatim.
    async fn save_locked(&self, rows: &[String]) -> Result<(), ServiceError> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ServiceError::Io(format!("{}: {}", parent.display(), e)))?;
            }
        }
        let mut out = String::with_capacity(BAN_CSV_HEADER.len() + 1 + rows.len() * 48);
        out.push_str(BAN_CSV_HEADER);
        out.push('\n');
        for row in rows.iter().filter(|r| !r.trim().is_empty()) {
            out.push_str(row);
            out.push('\n');
        }
        let tmp = temp_path(&self.file_path);
        fs::write(&tmp, out)
            .await
            .map_err(|e| ServiceError::Io(format!("{}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.file_path)
            .await
            .map_err(|e| ServiceError::Io(format!("{}: {}", self.file_path.display(), e)))?;
        Ok(())
    }
}
