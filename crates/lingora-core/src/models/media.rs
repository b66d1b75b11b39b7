use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use crate::error::AppError;

/// Resource kind as reported by the storage collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "resource_kind", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Image,
    Video,
    Audio,
    Raw,
}

/// Browsing category of a ledger asset. Supplied explicitly by the caller or
/// inferred from the upload field name and filename (see [`infer_category`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "asset_category", rename_all = "kebab-case")
)]
#[serde(rename_all = "kebab-case")]
pub enum AssetCategory {
    HeroVideo,
    HeroBackground,
    AboutImage,
    GameScreenshot,
    CharacterImage,
    FeatureIcon,
    TeamPhoto,
    Logo,
    Thumbnail,
    General,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::HeroVideo => "hero-video",
            AssetCategory::HeroBackground => "hero-background",
            AssetCategory::AboutImage => "about-image",
            AssetCategory::GameScreenshot => "game-screenshot",
            AssetCategory::CharacterImage => "character-image",
            AssetCategory::FeatureIcon => "feature-icon",
            AssetCategory::TeamPhoto => "team-photo",
            AssetCategory::Logo => "logo",
            AssetCategory::Thumbnail => "thumbnail",
            AssetCategory::General => "general",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hero-video" => Ok(AssetCategory::HeroVideo),
            "hero-background" => Ok(AssetCategory::HeroBackground),
            "about-image" => Ok(AssetCategory::AboutImage),
            "game-screenshot" => Ok(AssetCategory::GameScreenshot),
            "character-image" => Ok(AssetCategory::CharacterImage),
            "feature-icon" => Ok(AssetCategory::FeatureIcon),
            "team-photo" => Ok(AssetCategory::TeamPhoto),
            "logo" => Ok(AssetCategory::Logo),
            "thumbnail" => Ok(AssetCategory::Thumbnail),
            "general" => Ok(AssetCategory::General),
            other => Err(AppError::Validation(format!(
                "Unknown asset category: {}",
                other
            ))),
        }
    }
}

/// Ordered first-match-wins inference rules. Matching on filenames is
/// inherently ambiguous ("team_hero.png" matches two rules), so the rule
/// order is the contract: earlier rows win. `hero_bg` must precede `hero`:
/// every `hero_bg` name also contains `hero`, so with the rows swapped the
/// hero-background category could never be inferred.
const CATEGORY_RULES: &[(&[&str], AssetCategory)] = &[
    (&["hero_bg"], AssetCategory::HeroBackground),
    (&["hero", "intro"], AssetCategory::HeroVideo),
    (&["about"], AssetCategory::AboutImage),
    (&["game", "screenshot"], AssetCategory::GameScreenshot),
    (&["character", "ana"], AssetCategory::CharacterImage),
    (&["feature", "icon"], AssetCategory::FeatureIcon),
    (&["team", "artist"], AssetCategory::TeamPhoto),
    (&["logo"], AssetCategory::Logo),
    (&["thumb"], AssetCategory::Thumbnail),
];

/// Infer the browsing category of an upload. An explicit caller-supplied
/// category always wins; otherwise the upload field name and original
/// filename are scanned against [`CATEGORY_RULES`].
pub fn infer_category(
    explicit: Option<AssetCategory>,
    field_name: &str,
    filename: &str,
) -> AssetCategory {
    if let Some(category) = explicit {
        return category;
    }
    let haystack = format!("{} {}", field_name, filename).to_lowercase();
    for (keywords, category) in CATEGORY_RULES {
        if keywords.iter().any(|kw| haystack.contains(kw)) {
            return *category;
        }
    }
    AssetCategory::General
}

/// One derived rendition of an asset (size label plus URL and dimensions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizedVariant {
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
}

/// A media asset ledger record. Rows exist only for objects that were
/// successfully pushed to the storage collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAsset {
    pub id: Uuid,
    /// External object-storage identity.
    pub storage_id: String,
    pub url: String,
    pub secure_url: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub resource_kind: ResourceKind,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub duration_seconds: Option<f64>,
    pub category: AssetCategory,
    pub usage_count: i64,
    pub last_used_at: Option<DateTime<Utc>>,
    pub optimized_variants: Vec<OptimizedVariant>,
    pub uploaded_by: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row for the media_assets table.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct MediaAssetRow {
    pub id: Uuid,
    pub storage_id: String,
    pub url: String,
    pub secure_url: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub resource_kind: ResourceKind,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub duration_seconds: Option<f64>,
    pub category: AssetCategory,
    pub usage_count: i64,
    pub last_used_at: Option<DateTime<Utc>>,
    pub optimized_variants: JsonValue,
    pub uploaded_by: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaAssetRow {
    pub fn into_asset(self) -> Result<MediaAsset, AppError> {
        Ok(MediaAsset {
            id: self.id,
            storage_id: self.storage_id,
            url: self.url,
            secure_url: self.secure_url,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes,
            resource_kind: self.resource_kind,
            width: self.width,
            height: self.height,
            duration_seconds: self.duration_seconds,
            category: self.category,
            usage_count: self.usage_count,
            last_used_at: self.last_used_at,
            optimized_variants: serde_json::from_value(self.optimized_variants)?,
            uploaded_by: self.uploaded_by,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_category_wins_over_inference() {
        assert_eq!(
            infer_category(Some(AssetCategory::Logo), "hero_video", "intro.mp4"),
            AssetCategory::Logo
        );
    }

    #[test]
    fn infers_from_field_name_and_filename() {
        assert_eq!(
            infer_category(None, "hero_video", "clip.mp4"),
            AssetCategory::HeroVideo
        );
        assert_eq!(
            infer_category(None, "file", "hero_bg_desktop.png"),
            AssetCategory::HeroBackground
        );
        assert_eq!(
            infer_category(None, "file", "about-us.jpg"),
            AssetCategory::AboutImage
        );
        assert_eq!(
            infer_category(None, "file", "screenshot_04.png"),
            AssetCategory::GameScreenshot
        );
        assert_eq!(
            infer_category(None, "upload", "ana_portrait.png"),
            AssetCategory::CharacterImage
        );
        assert_eq!(
            infer_category(None, "file", "icon-speed.svg"),
            AssetCategory::FeatureIcon
        );
        assert_eq!(
            infer_category(None, "file", "artist_photo.jpg"),
            AssetCategory::TeamPhoto
        );
        assert_eq!(infer_category(None, "logo", "site.png"), AssetCategory::Logo);
        assert_eq!(
            infer_category(None, "file", "thumb_small.jpg"),
            AssetCategory::Thumbnail
        );
        assert_eq!(
            infer_category(None, "file", "banner.png"),
            AssetCategory::General
        );
    }

    #[test]
    fn first_matching_rule_wins_on_ambiguous_names() {
        // "team_hero.png" matches both hero and team rules; hero comes first.
        assert_eq!(
            infer_category(None, "file", "team_hero.png"),
            AssetCategory::HeroVideo
        );
        // hero_bg outranks the plain hero rule.
        assert_eq!(
            infer_category(None, "file", "hero_bg.png"),
            AssetCategory::HeroBackground
        );
    }

    #[test]
    fn inference_is_case_insensitive() {
        assert_eq!(
            infer_category(None, "File", "TEAM_Photo.JPG"),
            AssetCategory::TeamPhoto
        );
    }

    #[test]
    fn category_round_trips_kebab_case() {
        for category in [
            AssetCategory::HeroVideo,
            AssetCategory::GameScreenshot,
            AssetCategory::General,
        ] {
            assert_eq!(category.as_str().parse::<AssetCategory>().unwrap(), category);
        }
    }
}
