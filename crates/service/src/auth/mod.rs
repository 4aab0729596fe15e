//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login and the "who is the current user" lookup that the web
//! layer runs on every request, plus password hashing that still accepts
//! werkzeug hashes from earlier deployments.

pub mod domain;
pub mod errors;
pub mod password;
pub mod repository;
pub mod service;

pub use service::AuthService;
