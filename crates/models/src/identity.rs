//! Identity rules shared by users and bans: ids, emails, nicknames.

use uuid::Uuid;

use crate::errors::ModelError;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => Ok(()),
        _ => Err(ModelError::Validation("invalid email".into())),
    }
}

/// Case-insensitive comparison used for emails and nicknames.
pub fn same_identity(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Lowercase and keep only `[a-z0-9_.-]`.
pub fn sanitize_nickname(raw: &str) -> Result<String, ModelError> {
    let nick: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-'))
        .collect();
    if nick.is_empty() {
        return Err(ModelError::Validation("nickname must contain at least one of [a-z0-9_.-]".into()));
    }
    Ok(nick)
}

/// Nickname used when the registration form leaves it blank: the email's local part.
pub fn default_nickname(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}
