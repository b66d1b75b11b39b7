//! Database repositories for the localized content repository.
//!
//! Each repository owns one logical collection and provides the CRUD,
//! query/resolution, and batch operations of that entity family. Atomicity
//! contracts (bulk reorder, play-count increment, usage accounting) are
//! implemented as single SQL statements, never application-level
//! read-modify-write loops.

pub mod db;

pub use db::{
    ContentRepository, MediaAssetRepository, MediaLedgerStats, QuerySubmissionRepository,
    SiteConfigRepository, SongRepository,
};
