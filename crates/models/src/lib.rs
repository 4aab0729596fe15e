//! Entity shapes for the flat-file collections plus the small pure helpers
//! (timestamps, identity normalization, upload paths) every service shares.
//!
//! Records are typed but forward compatible: fields this crate does not know
//! about are kept in each record's `extra` map and written back unchanged.

pub mod errors;
pub mod time;
pub mod identity;
pub mod media;
pub mod user;
pub mod post;
pub mod comment;
pub mod tag;
pub mod ban;
pub mod collection_point;

pub use ban::Ban;
pub use collection_point::{CollectionPoint, WasteType};
pub use comment::Comment;
pub use post::Post;
pub use tag::Tag;
pub use user::User;

/// Unknown JSON fields carried through read/modify/write cycles.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// Deserialize a field that older writers stored as `null`, reading it as the default.
/// Use together with `#[serde(default)]` so absent keys default too.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Option::unwrap_or_default)
}
