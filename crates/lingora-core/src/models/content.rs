use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use crate::error::AppError;
use crate::localization::{LanguageCode, LocalizedText};

/// Fixed enumeration of page-section types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "content_type", rename_all = "kebab-case")
)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    Hero,
    About,
    Highlights,
    AnaBio,
    Features,
    Team,
    Footer,
    Navbar,
    General,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Hero => "hero",
            ContentType::About => "about",
            ContentType::Highlights => "highlights",
            ContentType::AnaBio => "ana-bio",
            ContentType::Features => "features",
            ContentType::Team => "team",
            ContentType::Footer => "footer",
            ContentType::Navbar => "navbar",
            ContentType::General => "general",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hero" => Ok(ContentType::Hero),
            "about" => Ok(ContentType::About),
            "highlights" => Ok(ContentType::Highlights),
            "ana-bio" => Ok(ContentType::AnaBio),
            "features" => Ok(ContentType::Features),
            "team" => Ok(ContentType::Team),
            "footer" => Ok(ContentType::Footer),
            "navbar" => Ok(ContentType::Navbar),
            "general" => Ok(ContentType::General),
            other => Err(AppError::Validation(format!(
                "Unknown content type: {}",
                other
            ))),
        }
    }
}

/// Structured media references into the asset ledger. Referenced assets are
/// never cascade-deleted with the owning item, and deletion of the item is
/// never blocked by dangling references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRefs {
    #[serde(default)]
    pub images: Vec<Uuid>,
    #[serde(default)]
    pub videos: Vec<Uuid>,
    #[serde(default)]
    pub thumbnail: Option<Uuid>,
}

/// Display/visibility metadata. `order` is a display sequence, not required
/// to be unique across items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMetadata {
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-text sub-bucket used by the UI, not validated against an enum.
    #[serde(default)]
    pub category: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for ContentMetadata {
    fn default() -> Self {
        Self {
            order: 0,
            is_active: true,
            is_featured: false,
            tags: Vec::new(),
            category: None,
        }
    }
}

/// Localized SEO block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seo {
    #[serde(default)]
    pub meta_title: LocalizedText,
    #[serde(default)]
    pub meta_description: LocalizedText,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A content item with every language present (editor view).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    /// Editor-assigned or auto-derived slug, unique across content items.
    pub key: String,
    pub content_type: ContentType,
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub subtitle: LocalizedText,
    /// Direct single-asset URLs, independent of the media ledger.
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub media: Option<MediaRefs>,
    pub metadata: ContentMetadata,
    pub seo: Option<Seo>,
    /// Opaque editor identities supplied by the external credential layer.
    pub created_by: Option<String>,
    pub last_modified_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: DateTime<Utc>,
}

/// Database row for the content_items table. Localized bags, media refs, and
/// the SEO block live in JSONB columns; display metadata is flattened into
/// ordinary columns so it can be filtered and sorted in SQL.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct ContentRow {
    pub id: Uuid,
    pub key: String,
    pub content_type: ContentType,
    pub title: JsonValue,
    pub description: JsonValue,
    pub subtitle: JsonValue,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub media: Option<JsonValue>,
    pub display_order: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub seo: Option<JsonValue>,
    pub created_by: Option<String>,
    pub last_modified_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: DateTime<Utc>,
}

impl ContentRow {
    pub fn into_item(self) -> Result<ContentItem, AppError> {
        Ok(ContentItem {
            id: self.id,
            key: self.key,
            content_type: self.content_type,
            title: serde_json::from_value(self.title)?,
            description: serde_json::from_value(self.description)?,
            subtitle: serde_json::from_value(self.subtitle)?,
            image_url: self.image_url,
            video_url: self.video_url,
            media: self.media.map(serde_json::from_value).transpose()?,
            metadata: ContentMetadata {
                order: self.display_order,
                is_active: self.is_active,
                is_featured: self.is_featured,
                tags: self.tags,
                category: self.category,
            },
            seo: self.seo.map(serde_json::from_value).transpose()?,
            created_by: self.created_by,
            last_modified_by: self.last_modified_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
            published_at: self.published_at,
        })
    }
}

/// Input for creating a content item. `title.en` is mandatory; a missing key
/// is auto-derived from it.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContentInput {
    pub key: Option<String>,
    pub content_type: ContentType,
    pub title: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub subtitle: LocalizedText,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub media: Option<MediaRefs>,
    #[serde(default)]
    pub metadata: ContentMetadata,
    #[serde(default)]
    pub seo: Option<Seo>,
}

/// Partial update: omitted fields are untouched, not cleared. Localized
/// fields merge per-language.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContentInput {
    pub key: Option<String>,
    pub content_type: Option<ContentType>,
    pub title: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub subtitle: Option<LocalizedText>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub media: Option<MediaRefs>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
    pub seo: Option<Seo>,
}

impl ContentItem {
    /// Apply a partial update in place. Key uniqueness is the repository's
    /// concern; this only merges fields.
    pub fn apply_update(&mut self, input: UpdateContentInput) {
        if let Some(key) = input.key {
            self.key = key;
        }
        if let Some(content_type) = input.content_type {
            self.content_type = content_type;
        }
        if let Some(title) = input.title {
            self.title.merge(&title);
        }
        if let Some(description) = input.description {
            self.description.merge(&description);
        }
        if let Some(subtitle) = input.subtitle {
            self.subtitle.merge(&subtitle);
        }
        if let Some(image_url) = input.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(video_url) = input.video_url {
            self.video_url = Some(video_url);
        }
        if let Some(media) = input.media {
            self.media = Some(media);
        }
        if let Some(order) = input.order {
            self.metadata.order = order;
        }
        if let Some(is_active) = input.is_active {
            self.metadata.is_active = is_active;
        }
        if let Some(is_featured) = input.is_featured {
            self.metadata.is_featured = is_featured;
        }
        if let Some(tags) = input.tags {
            self.metadata.tags = tags;
        }
        if let Some(category) = input.category {
            self.metadata.category = Some(category);
        }
        if let Some(seo) = input.seo {
            self.seo = Some(seo);
        }
    }
}

/// Single-language visitor view of a content item.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedContent {
    pub id: Uuid,
    pub key: String,
    pub content_type: ContentType,
    pub title: String,
    pub description: String,
    pub subtitle: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub media: Option<MediaRefs>,
    pub order: i32,
    pub is_featured: bool,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl ResolvedContent {
    pub fn from_item(item: &ContentItem, language: LanguageCode) -> Self {
        Self {
            id: item.id,
            key: item.key.clone(),
            content_type: item.content_type,
            title: item.title.resolve(language).to_string(),
            description: item.description.resolve(language).to_string(),
            subtitle: item.subtitle.resolve(language).to_string(),
            image_url: item.image_url.clone(),
            video_url: item.video_url.clone(),
            media: item.media.clone(),
            order: item.metadata.order,
            is_featured: item.metadata.is_featured,
            tags: item.metadata.tags.clone(),
            category: item.metadata.category.clone(),
            published_at: item.published_at,
        }
    }
}

/// Visitor content response: items grouped by content type.
#[derive(Debug, Clone, Serialize)]
pub struct ContentGroup {
    pub content_type: ContentType,
    pub items: Vec<ResolvedContent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> ContentItem {
        ContentItem {
            id: Uuid::new_v4(),
            key: "welcome".to_string(),
            content_type: ContentType::Hero,
            title: LocalizedText::from([
                (LanguageCode::En, "Welcome"),
                (LanguageCode::Es, "Bienvenido"),
            ]),
            description: LocalizedText::english("Landing hero"),
            subtitle: LocalizedText::new(),
            image_url: None,
            video_url: None,
            media: None,
            metadata: ContentMetadata::default(),
            seo: None,
            created_by: Some("editor-1".to_string()),
            last_modified_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            published_at: Utc::now(),
        }
    }

    #[test]
    fn content_type_round_trips_kebab_case() {
        assert_eq!(ContentType::AnaBio.as_str(), "ana-bio");
        assert_eq!("ana-bio".parse::<ContentType>().unwrap(), ContentType::AnaBio);
        let json = serde_json::to_string(&ContentType::AnaBio).unwrap();
        assert_eq!(json, "\"ana-bio\"");
    }

    #[test]
    fn apply_update_merges_localized_fields() {
        let mut item = sample_item();
        let mut title = LocalizedText::new();
        title.set(LanguageCode::Ja, "ようこそ");
        item.apply_update(UpdateContentInput {
            title: Some(title),
            ..Default::default()
        });
        // Existing languages survive a partial localized update
        assert_eq!(item.title.resolve(LanguageCode::En), "Welcome");
        assert_eq!(item.title.resolve(LanguageCode::Es), "Bienvenido");
        assert_eq!(item.title.resolve(LanguageCode::Ja), "ようこそ");
    }

    #[test]
    fn apply_update_leaves_omitted_fields_untouched() {
        let mut item = sample_item();
        item.apply_update(UpdateContentInput {
            is_featured: Some(true),
            ..Default::default()
        });
        assert!(item.metadata.is_featured);
        assert!(item.metadata.is_active);
        assert_eq!(item.key, "welcome");
        assert_eq!(item.description.resolve(LanguageCode::En), "Landing hero");
    }

    #[test]
    fn resolved_view_falls_back_to_english() {
        let item = sample_item();
        let resolved = ResolvedContent::from_item(&item, LanguageCode::Ru);
        assert_eq!(resolved.title, "Welcome");
        let resolved_es = ResolvedContent::from_item(&item, LanguageCode::Es);
        assert_eq!(resolved_es.title, "Bienvenido");
    }

    #[test]
    fn row_into_item_parses_jsonb_bags() {
        let row = ContentRow {
            id: Uuid::new_v4(),
            key: "hero_main".to_string(),
            content_type: ContentType::Hero,
            title: serde_json::json!({"en": "Welcome"}),
            description: serde_json::json!({}),
            subtitle: serde_json::json!({}),
            image_url: None,
            video_url: None,
            media: Some(serde_json::json!({"images": [], "videos": [], "thumbnail": null})),
            display_order: 3,
            is_active: true,
            is_featured: false,
            tags: vec!["landing".to_string()],
            category: None,
            seo: None,
            created_by: None,
            last_modified_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            published_at: Utc::now(),
        };
        let item = row.into_item().unwrap();
        assert_eq!(item.metadata.order, 3);
        assert_eq!(item.title.resolve(LanguageCode::En), "Welcome");
        assert_eq!(item.media, Some(MediaRefs::default()));
    }
}
