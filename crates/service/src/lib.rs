//! Service layer for the waste-report community app.
//! - `storage` owns the flat-file collections and their locking.
//! - Entity services express uniqueness, cascades and permissions on top of it.
//! - Callers pass an explicit `Actor` instead of relying on ambient session state.

pub mod errors;
pub mod actor;
pub mod storage;
pub mod pagination;
pub mod auth;
pub mod users;
pub mod posts;
pub mod comments;
pub mod tags;
pub mod moderation;
pub mod collection_points;
pub mod uploads;
pub mod admin;
pub mod runtime;
#[cfg(test)]
pub mod test_support;

pub use actor::Actor;
pub use errors::ServiceError;
pub use storage::Storage;
