use async_trait::async_trait;
use models::User;

use super::errors::AuthError;
use crate::storage::Storage;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, AuthError>;
    /// Insert `user`, enforcing email and nickname uniqueness (case-insensitive)
    /// in the same step as the write.
    async fn insert_user(&self, user: User) -> Result<User, AuthError>;
    async fn is_banned(&self, email: &str) -> Result<bool, AuthError>;
    async fn update_password_hash(&self, user_id: &str, password_hash: String) -> Result<(), AuthError>;
}

/// Repository over the flat-file collections.
#[derive(Clone, Debug)]
pub struct FileAuthRepository {
    storage: Storage,
}

impl FileAuthRepository {
    pub fn new(storage: Storage) -> Self { Self { storage } }
}

#[async_trait]
impl AuthRepository for FileAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let users = self.storage.users.read_all().await;
        Ok(users.into_iter().find(|u| u.has_email(email)))
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, AuthError> {
        let users = self.storage.users.read_all().await;
        Ok(users.into_iter().find(|u| u.id == id))
    }

    async fn insert_user(&self, user: User) -> Result<User, AuthError> {
        self.storage
            .users
            .try_update(|users| {
                check_unique(users, &user)?;
                users.push(user.clone());
                Ok(user)
            })
            .await
    }

    async fn is_banned(&self, email: &str) -> Result<bool, AuthError> {
        Ok(self.storage.bans.is_banned(email).await)
    }

    async fn update_password_hash(&self, user_id: &str, password_hash: String) -> Result<(), AuthError> {
        self.storage
            .users
            .try_update(|users| {
                let user = users.iter_mut().find(|u| u.id == user_id).ok_or(AuthError::NotFound)?;
                user.password_hash = password_hash;
                Ok(())
            })
            .await
    }
}

fn check_unique(existing: &[User], candidate: &User) -> Result<(), AuthError> {
    if existing.iter().any(|u| u.has_email(&candidate.email)) {
        return Err(AuthError::Conflict);
    }
    if existing.iter().any(|u| u.has_nickname(&candidate.nickname)) {
        return Err(AuthError::NicknameTaken);
    }
    Ok(())
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<Vec<User>>,
        banned: Mutex<HashSet<String>>, // lowercase emails
    }

    impl MockAuthRepository {
        pub fn ban(&self, email: &str) {
            self.banned.lock().unwrap().insert(email.trim().to_lowercase());
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.has_email(email)).cloned())
        }

        async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.id == id).cloned())
        }

        async fn insert_user(&self, user: User) -> Result<User, AuthError> {
            let mut users = self.users.lock().unwrap();
            check_unique(&users, &user)?;
            users.push(user.clone());
            Ok(user)
        }

        async fn is_banned(&self, email: &str) -> Result<bool, AuthError> {
            Ok(self.banned.lock().unwrap().contains(&email.trim().to_lowercase()))
        }

        async fn update_password_hash(&self, user_id: &str, password_hash: String) -> Result<(), AuthError> {
            let mut users = self.users.lock().unwrap();
            let user = users.iter_mut().find(|u| u.id == user_id).ok_or(AuthError::NotFound)?;
            user.password_hash = password_hash;
            Ok(())
        }
    }
}
