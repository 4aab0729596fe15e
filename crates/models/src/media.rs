//! Upload path conventions. Stored paths are relative to the static root and
//! always use `/`, so they can be turned into URLs without rewriting.

use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

pub fn normalize_path(raw: &str) -> String {
    raw.replace('\\', "/")
}

/// Reduce an uploaded filename to a safe ASCII basename.
pub fn secure_filename(raw: &str) -> String {
    let base = normalize_path(raw);
    let base = base.rsplit('/').next().unwrap_or_default();
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    cleaned.trim_start_matches(|c: char| c == '.' || c == '_').to_string()
}

/// Lowercased extension including the dot, or empty.
pub fn extension(filename: &str) -> String {
    let name = secure_filename(filename);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => format!(".{}", ext.to_lowercase()),
        _ => String::new(),
    }
}

pub fn profile_image_path(user_id: &str, original_filename: &str) -> String {
    format!("uploads/profile/profile_{}{}", user_id, extension(original_filename))
}

pub fn cover_image_path(user_id: &str, original_filename: &str) -> String {
    format!("uploads/cover/cover_{}{}", user_id, extension(original_filename))
}

pub fn post_image_path(author_id: &str, original_filename: &str) -> String {
    format!(
        "uploads/{}/posts/post_{}_{}",
        author_id,
        Uuid::new_v4().simple(),
        secure_filename(original_filename)
    )
}

/// Join a stored relative path onto `root`; `None` for paths that would escape it.
pub fn resolve_under(root: &Path, stored: &str) -> Option<PathBuf> {
    let rel = PathBuf::from(normalize_path(stored));
    if rel.as_os_str().is_empty() {
        return None;
    }
    let mut out = root.to_path_buf();
    for comp in rel.components() {
        match comp {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(out)
}
