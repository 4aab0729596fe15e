#![cfg(test)]
use std::path::PathBuf;

use configs::StorageConfig;
use models::{identity::new_id, time::now_timestamp, User};

use crate::actor::Actor;
use crate::storage::Storage;

/// Fresh storage under a unique temp directory. Remove it with `cleanup`.
pub async fn temp_storage() -> Result<(Storage, PathBuf), anyhow::Error> {
    let root = std::env::temp_dir().join(format!("sos_svc_{}", uuid::Uuid::new_v4()));
    let storage = Storage::open(&StorageConfig::rooted_at(&root)).await?;
    Ok((storage, root))
}

pub async fn cleanup(root: &PathBuf) {
    let _ = tokio::fs::remove_dir_all(root).await;
}

/// Insert a user directly, bypassing registration, and return its actor.
pub async fn seed_user(storage: &Storage, nickname: &str, is_admin: bool, is_dev: bool) -> Result<Actor, anyhow::Error> {
    let user = User {
        id: new_id(),
        email: format!("{nickname}@example.com"),
        nickname: nickname.to_string(),
        is_admin,
        is_dev,
        created_at: now_timestamp(),
        ..Default::default()
    };
    storage.users.append(user.clone()).await?;
    Ok(Actor::from_user(&user))
}
