//! Data models for the localized content repository
//!
//! Organized by entity family: content items, songs, singleton site configs
//! (footer, logo), the media asset ledger, visitor query submissions, and the
//! shared query/pagination types.

mod content;
mod media;
mod query;
mod site_config;
mod song;
mod submission;

pub use content::*;
pub use media::*;
pub use query::*;
pub use site_config::*;
pub use song::*;
pub use submission::*;
