use models::errors::ModelError;
use thiserror::Error;

use crate::errors::ServiceError;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("email already registered")]
    Conflict,
    #[error("nickname already taken")]
    NicknameTaken,
    #[error("user not found")]
    NotFound,
    #[error("invalid credentials")]
    Unauthorized,
    #[error("account banned")]
    Banned,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Conflict => 1002,
            AuthError::NotFound => 1003,
            AuthError::Unauthorized => 1004,
            AuthError::Banned => 1005,
            AuthError::NicknameTaken => 1006,
            AuthError::HashError(_) => 1101,
            AuthError::Storage(_) => 1200,
        }
    }
}

impl From<ServiceError> for AuthError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => AuthError::Validation(msg),
            ServiceError::Model(ModelError::Validation(msg)) => AuthError::Validation(msg),
            ServiceError::NotFound(_) => AuthError::NotFound,
            other => AuthError::Storage(other.to_string()),
        }
    }
}

impl From<ModelError> for AuthError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => AuthError::Validation(msg),
        }
    }
}
