//! Object-storage collaborator interface.
//!
//! The production storage service (Cloudinary-style image/video hosting) is
//! an external collaborator; this crate defines the trait the repositories
//! and upload pipeline talk to, plus a local-filesystem backend used for
//! development and tests.

pub mod local;
pub mod traits;

pub use local::LocalStorage;
pub use traits::{
    DerivedRendition, ObjectStorage, PushOptions, StorageBackend, StorageError, StorageResult,
    StoredObject,
};
