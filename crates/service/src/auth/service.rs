use std::sync::Arc;

use models::{
    identity::{default_nickname, new_id, normalize_email, sanitize_nickname, validate_email},
    time::now_timestamp,
    User,
};
use tracing::{debug, info, instrument, warn};

use super::domain::{AuthSession, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::password::{hash_password, verify_password, Verification};
use super::repository::AuthRepository;

const MIN_PASSWORD_LEN: usize = 8;

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::AuthService, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let svc = AuthService::new(Arc::new(MockAuthRepository::default()));
    /// let input = RegisterInput {
    ///     email: "User@Example.com".into(),
    ///     password: "Secret123".into(),
    ///     confirm_password: "Secret123".into(),
    ///     name: "Test".into(),
    ///     nickname: None,
    /// };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// assert_eq!(user.nickname, "user");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<User, AuthError> {
        let email = normalize_email(&input.email);
        validate_email(&email)?;
        if input.password != input.confirm_password {
            return Err(AuthError::Validation("passwords do not match".into()));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
        }
        let raw_nick = input
            .nickname
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| default_nickname(&email));
        let nickname = sanitize_nickname(raw_nick)?;

        if let Some(existing) = self.repo.find_user_by_email(&email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let password_hash = hash_password(&input.password)?;

        let user = User {
            id: new_id(),
            email,
            password_hash,
            nickname,
            name: input.name.trim().to_string(),
            created_at: now_timestamp(),
            ..Default::default()
        };
        let user = self.repo.insert_user(user).await?;
        info!(user_id = %user.id, email = %user.email, nickname = %user.nickname, "user_registered");
        Ok(user)
    }

    /// Authenticate a user. Banned emails are refused before credentials are checked.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::AuthService, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let svc = AuthService::new(Arc::new(MockAuthRepository::default()));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput {
    ///     email: "u@e.com".into(), password: "Passw0rd".into(), confirm_password: "Passw0rd".into(),
    ///     name: "N".into(), nickname: Some("nina".into()),
    /// }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "U@E.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.nickname, "nina");
    /// assert!(!session.is_admin);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let email = normalize_email(&input.email);
        if self.repo.is_banned(&email).await? {
            info!(%email, "login_refused_banned");
            return Err(AuthError::Banned);
        }

        let user = self.repo
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        match verify_password(&input.password, &user.password_hash) {
            Ok(Verification::Match) => {}
            Ok(Verification::LegacyMatch) => self.upgrade_hash(&user.id, &input.password).await,
            Ok(Verification::Mismatch) => return Err(AuthError::Unauthorized),
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "stored password hash is unusable");
                return Err(AuthError::Unauthorized);
            }
        }

        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession {
            user_id: user.id,
            email: user.email,
            nickname: user.nickname,
            is_admin: user.is_admin,
            is_dev: user.is_dev,
        })
    }

    /// Replace a werkzeug hash with argon2. Failure only costs the upgrade.
    async fn upgrade_hash(&self, user_id: &str, password: &str) {
        let result = match hash_password(password) {
            Ok(hash) => self.repo.update_password_hash(user_id, hash).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => info!(%user_id, "password_hash_upgraded"),
            Err(e) => warn!(%user_id, error = %e, "could not upgrade legacy password hash"),
        }
    }

    /// Resolve the session's user for a request. `None` when the account is
    /// gone or banned, in which case the caller should drop the session.
    pub async fn current_user(&self, user_id: &str) -> Result<Option<User>, AuthError> {
        let Some(user) = self.repo.find_user_by_id(user_id).await? else {
            return Ok(None);
        };
        if self.repo.is_banned(&user.email).await? {
            debug!(user_id = %user.id, "session user is banned");
            return Ok(None);
        }
        Ok(Some(user))
    }
}
