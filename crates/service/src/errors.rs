use models::errors::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("collection `{collection}` is corrupt: {reason}")]
    Corrupt { collection: String, reason: String },
    /// The primary record is gone but its dependents in `collection` were not removed.
    #[error("{entity} deleted but cleaning up `{collection}` failed: {reason}")]
    CascadeFailed { entity: String, collection: String, reason: String },
    #[error("storage io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serialize(String),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }
    pub fn forbidden(action: &str) -> Self { Self::Forbidden(format!("not allowed to {}", action)) }
}
