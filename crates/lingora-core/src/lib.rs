//! Lingora Core Library
//!
//! This crate provides the domain models, localization rules, error types,
//! configuration, and validation shared across all Lingora components.

pub mod config;
pub mod error;
pub mod localization;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::LingoraConfig;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use localization::{LanguageCode, LocalizedText};
