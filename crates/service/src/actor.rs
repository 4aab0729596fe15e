//! The authenticated caller, passed explicitly into every operation that
//! depends on who is asking.

use models::User;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub is_admin: bool,
    pub is_dev: bool,
}

impl Actor {
    pub fn from_user(user: &User) -> Self {
        Self { user_id: user.id.clone(), is_admin: user.is_admin, is_dev: user.is_dev }
    }

    pub fn require_admin(&self, action: &str) -> Result<(), ServiceError> {
        if self.is_admin { Ok(()) } else { Err(ServiceError::forbidden(action)) }
    }

    /// Developers manage administrators.
    pub fn require_dev(&self, action: &str) -> Result<(), ServiceError> {
        if self.is_dev { Ok(()) } else { Err(ServiceError::forbidden(action)) }
    }

    /// Owner of the resource, or an admin.
    pub fn can_manage(&self, owner_id: &str) -> bool {
        self.is_admin || self.user_id == owner_id
    }
}
