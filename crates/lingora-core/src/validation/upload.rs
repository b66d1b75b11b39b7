//! Upload validation: MIME allowlists, size ceilings, and batch limits.
//!
//! All checks here run before any network call reaches the storage
//! collaborator. A rejected file never leaves the process.

use crate::error::AppError;
use crate::models::ResourceKind;

pub const LOGO_UPLOAD_MAX_BYTES: usize = 5 * 1024 * 1024;
pub const GENERAL_UPLOAD_MAX_BYTES: usize = 100 * 1024 * 1024;
pub const MAX_FILES_PER_BATCH: usize = 10;

const IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];
// SVG is only acceptable on the logo path.
const LOGO_EXTRA_MIME_TYPES: &[&str] = &["image/svg+xml"];
const VIDEO_MIME_TYPES: &[&str] = &[
    "video/mp4",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-matroska",
    "video/webm",
];
const AUDIO_MIME_TYPES: &[&str] = &["audio/mpeg", "audio/mp3", "audio/wav", "audio/ogg"];

/// Which validation profile applies to an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadProfile {
    /// General media uploads: images, videos, song audio. 100 MB ceiling.
    General,
    /// Logo uploads: images only (SVG allowed). 5 MB ceiling.
    Logo,
}

impl UploadProfile {
    pub fn max_bytes(&self) -> usize {
        match self {
            UploadProfile::General => GENERAL_UPLOAD_MAX_BYTES,
            UploadProfile::Logo => LOGO_UPLOAD_MAX_BYTES,
        }
    }
}

/// Validate declared MIME type and payload size for a profile, returning the
/// resource kind the storage collaborator should treat the bytes as.
pub fn validate_upload(
    profile: UploadProfile,
    content_type: &str,
    size_bytes: usize,
) -> Result<ResourceKind, AppError> {
    let kind = match profile {
        UploadProfile::Logo => {
            if IMAGE_MIME_TYPES.contains(&content_type)
                || LOGO_EXTRA_MIME_TYPES.contains(&content_type)
            {
                ResourceKind::Image
            } else {
                return Err(AppError::Validation(format!(
                    "Unsupported logo MIME type: {}",
                    content_type
                )));
            }
        }
        UploadProfile::General => {
            if IMAGE_MIME_TYPES.contains(&content_type) {
                ResourceKind::Image
            } else if VIDEO_MIME_TYPES.contains(&content_type) {
                ResourceKind::Video
            } else if AUDIO_MIME_TYPES.contains(&content_type) {
                ResourceKind::Audio
            } else {
                return Err(AppError::Validation(format!(
                    "Unsupported MIME type: {}",
                    content_type
                )));
            }
        }
    };

    if size_bytes == 0 {
        return Err(AppError::Validation("File is empty".to_string()));
    }
    if size_bytes > profile.max_bytes() {
        return Err(AppError::PayloadTooLarge(format!(
            "{} bytes exceeds max {} bytes",
            size_bytes,
            profile.max_bytes()
        )));
    }

    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_images_on_both_profiles() {
        assert_eq!(
            validate_upload(UploadProfile::General, "image/png", 1024).unwrap(),
            ResourceKind::Image
        );
        assert_eq!(
            validate_upload(UploadProfile::Logo, "image/webp", 1024).unwrap(),
            ResourceKind::Image
        );
    }

    #[test]
    fn svg_is_logo_only() {
        assert!(validate_upload(UploadProfile::Logo, "image/svg+xml", 512).is_ok());
        assert!(validate_upload(UploadProfile::General, "image/svg+xml", 512).is_err());
    }

    #[test]
    fn video_rejected_on_logo_profile() {
        assert!(validate_upload(UploadProfile::Logo, "video/mp4", 1024).is_err());
        assert_eq!(
            validate_upload(UploadProfile::General, "video/mp4", 1024).unwrap(),
            ResourceKind::Video
        );
    }

    #[test]
    fn rejects_unknown_mime_type() {
        let err = validate_upload(UploadProfile::General, "application/pdf", 1024).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn enforces_size_ceilings_per_profile() {
        assert!(validate_upload(UploadProfile::Logo, "image/png", LOGO_UPLOAD_MAX_BYTES).is_ok());
        let err = validate_upload(UploadProfile::Logo, "image/png", LOGO_UPLOAD_MAX_BYTES + 1)
            .unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));

        assert!(validate_upload(
            UploadProfile::General,
            "video/mp4",
            GENERAL_UPLOAD_MAX_BYTES + 1
        )
        .is_err());
    }

    #[test]
    fn rejects_empty_file() {
        assert!(validate_upload(UploadProfile::General, "image/png", 0).is_err());
    }
}
