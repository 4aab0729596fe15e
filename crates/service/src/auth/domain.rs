use serde::{Deserialize, Serialize};

use crate::actor::Actor;

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub name: String,
    /// Falls back to the email's local part when absent or blank.
    #[serde(default)]
    pub nickname: Option<String>,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// What the web layer keeps in its session after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: String,
    pub email: String,
    pub nickname: String,
    pub is_admin: bool,
    pub is_dev: bool,
}

impl AuthSession {
    pub fn actor(&self) -> Actor {
        Actor { user_id: self.user_id.clone(), is_admin: self.is_admin, is_dev: self.is_dev }
    }
}
