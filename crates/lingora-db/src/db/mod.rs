//! Database repositories for data access layer
//!
//! Each repository is responsible for a specific entity family and provides
//! CRUD operations plus its specialized queries.

pub mod content;
pub mod media;
pub mod site_config;
pub mod song;
pub mod submission;

pub use content::ContentRepository;
pub use media::{MediaAssetRepository, MediaLedgerStats};
pub use site_config::SiteConfigRepository;
pub use song::SongRepository;
pub use submission::QuerySubmissionRepository;

/// Serialize into a JSONB bind value. The model types here are plain maps
/// and structs with string keys, so serialization cannot fail in practice;
/// a null lands in the column rather than aborting the statement.
pub(crate) fn json_or_null<T: serde::Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}
