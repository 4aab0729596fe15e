//! Email bans. Bans are enforced at login and when resolving a session.

use models::{identity::normalize_email, Ban};
use tracing::{info, warn};

use crate::{actor::Actor, errors::ServiceError, storage::Storage};

#[derive(Clone, Debug)]
pub struct BanService {
    storage: Storage,
}

impl BanService {
    pub fn new(storage: Storage) -> Self { Self { storage } }

    /// Ban `email`. Returns `false` when it was already banned. Admin
    /// accounts cannot be banned.
    pub async fn ban(&self, actor: &Actor, email: &str, reason: &str) -> Result<bool, ServiceError> {
        actor.require_admin("ban users")?;
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(ServiceError::Validation("email is required".into()));
        }
        let target = self.storage.users.try_read_all().await?.into_iter().find(|u| u.has_email(&email));
        if target.as_ref().is_some_and(|u| u.is_admin) {
            warn!(%email, by = %actor.user_id, "refusing to ban an administrator");
            return Err(ServiceError::forbidden("ban an administrator"));
        }
        let added = self.storage.bans.add_ban(&email, reason).await?;
        if added {
            info!(%email, by = %actor.user_id, known_user = target.is_some(), "user_banned");
        }
        Ok(added)
    }

    /// Lift a ban. Returns whether one existed.
    pub async fn unban(&self, actor: &Actor, email: &str) -> Result<bool, ServiceError> {
        actor.require_admin("unban users")?;
        let removed = self.storage.bans.remove_ban(email).await?;
        info!(email = %normalize_email(email), removed, by = %actor.user_id, "user_unbanned");
        Ok(removed)
    }

    pub async fn list(&self) -> Vec<Ban> {
        self.storage.bans.list_bans().await
    }

    pub async fn is_banned(&self, email: &str) -> bool {
        self.storage.bans.is_banned(email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cleanup, seed_user, temp_storage};

    #[tokio::test]
    async fn admins_ban_members_but_not_each_other() -> Result<(), anyhow::Error> {
        let (storage, root) = temp_storage().await?;
        let admin = seed_user(&storage, "root", true, false).await?;
        seed_user(&storage, "boss", true, false).await?;
        let ana = seed_user(&storage, "ana", false, false).await?;
        let bans = BanService::new(storage.clone());

        assert!(matches!(bans.ban(&ana, "root@example.com", "x").await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(bans.ban(&admin, "BOSS@example.com", "x").await, Err(ServiceError::Forbidden(_))));
        assert!(!bans.is_banned("boss@example.com").await);

        assert!(bans.ban(&admin, " Ana@Example.com ", "spam, flood").await?);
        assert!(!bans.ban(&admin, "ana@example.com", "again").await?);
        assert!(bans.is_banned("ANA@example.com").await);
        let list = bans.list().await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].email, "ana@example.com");
        assert_eq!(list[0].reason, "spam  flood");

        // bans are keyed by email, so unknown addresses can be banned too
        assert!(bans.ban(&admin, "stranger@x.com", "pre-emptive").await?);

        assert!(matches!(bans.unban(&ana, "ana@example.com").await, Err(ServiceError::Forbidden(_))));
        assert!(bans.unban(&admin, "ana@example.com").await?);
        assert!(!bans.unban(&admin, "ana@example.com").await?);
        assert!(!bans.is_banned("ana@example.com").await);

        cleanup(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_users_block_bans() -> Result<(), anyhow::Error> {
        let (storage, root) = temp_storage().await?;
        let admin = Actor { user_id: "root".into(), is_admin: true, is_dev: false };
        tokio::fs::write(storage.users.path(), b"[{\"id\": \"u1\", \"is_admin\": tru").await?;

        let res = BanService::new(storage.clone()).ban(&admin, "boss@example.com", "x").await;
        assert!(matches!(res, Err(ServiceError::Corrupt { .. })));
        assert!(storage.bans.list_bans().await.is_empty());

        cleanup(&root).await;
        Ok(())
    }
}
