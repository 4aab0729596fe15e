//! Account lookups, profile edits and admin role changes.

use models::{identity::sanitize_nickname, media::normalize_path, User};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{actor::Actor, errors::ServiceError, storage::Storage};

/// Profile fields a user may change; `None` leaves the field untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub nickname: Option<String>,
    /// Stored upload path, e.g. `PlannedUpload::stored_path` from `UploadPolicy::profile_image`.
    pub profile_image: Option<String>,
    pub cover_image: Option<String>,
}

#[derive(Clone, Debug)]
pub struct UserService {
    storage: Storage,
}

impl UserService {
    pub fn new(storage: Storage) -> Self { Self { storage } }

    pub async fn list(&self) -> Vec<User> {
        self.storage.users.read_all().await
    }

    pub async fn by_id(&self, id: &str) -> Option<User> {
        self.list().await.into_iter().find(|u| u.id == id)
    }

    pub async fn by_email(&self, email: &str) -> Option<User> {
        self.list().await.into_iter().find(|u| u.has_email(email))
    }

    pub async fn by_nickname(&self, nickname: &str) -> Option<User> {
        self.list().await.into_iter().find(|u| u.has_nickname(nickname))
    }

    /// Update the actor's own profile. A new nickname is sanitized and must
    /// not belong to anyone else.
    #[instrument(skip(self, actor, update), fields(user_id = %actor.user_id))]
    pub async fn update_profile(&self, actor: &Actor, update: ProfileUpdate) -> Result<User, ServiceError> {
        let nickname = match update.nickname.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(sanitize_nickname(raw)?),
            _ => None,
        };
        let user_id = actor.user_id.clone();
        let updated = self
            .storage
            .users
            .update(move |users| {
                if let Some(nick) = &nickname {
                    if users.iter().any(|u| u.id != user_id && u.has_nickname(nick)) {
                        return Err(ServiceError::Conflict("nickname already taken".into()));
                    }
                }
                let me = users
                    .iter_mut()
                    .find(|u| u.id == user_id)
                    .ok_or_else(|| ServiceError::not_found("user"))?;
                if let Some(nick) = nickname {
                    me.nickname = nick;
                }
                if let Some(path) = update.profile_image {
                    me.profile_image = normalize_path(&path);
                }
                if let Some(path) = update.cover_image {
                    me.cover_image = normalize_path(&path);
                }
                Ok(me.clone())
            })
            .await?;
        info!(nickname = %updated.nickname, "profile_updated");
        Ok(updated)
    }

    /// Grant admin rights. Admins only.
    pub async fn promote(&self, actor: &Actor, user_id: &str) -> Result<User, ServiceError> {
        actor.require_admin("promote users")?;
        let user = self.set_admin(user_id, true).await?;
        info!(by = %actor.user_id, user_id = %user.id, "user_promoted");
        Ok(user)
    }

    /// Revoke admin rights. Developers only.
    pub async fn demote(&self, actor: &Actor, user_id: &str) -> Result<User, ServiceError> {
        actor.require_dev("demote administrators")?;
        let user = self.set_admin(user_id, false).await?;
        info!(by = %actor.user_id, user_id = %user.id, "user_demoted");
        Ok(user)
    }

    async fn set_admin(&self, user_id: &str, is_admin: bool) -> Result<User, ServiceError> {
        self.storage
            .users
            .update(|users| {
                let user = users
                    .iter_mut()
                    .find(|u| u.id == user_id)
                    .ok_or_else(|| ServiceError::not_found("user"))?;
                user.is_admin = is_admin;
                Ok(user.clone())
            })
            .await
    }
}
