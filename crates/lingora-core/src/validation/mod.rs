//! Validation modules

pub mod slug;
pub mod upload;

pub use slug::{derive_key, validate_key, KEY_MAX_LEN, KEY_MIN_LEN};
pub use upload::{
    validate_upload, UploadProfile, GENERAL_UPLOAD_MAX_BYTES, LOGO_UPLOAD_MAX_BYTES,
    MAX_FILES_PER_BATCH,
};
