use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::localization::LanguageCode;
use crate::models::ContentType;

pub const MIN_PAGE_SIZE: i64 = 1;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Page/limit pagination, clamped to 1–100 items per page.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn clamped(&self) -> (i64, i64) {
        let limit = self.limit.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
        let page = self.page.max(1);
        (page, limit)
    }

    pub fn offset(&self) -> i64 {
        let (page, limit) = self.clamped();
        (page - 1) * limit
    }
}

/// Pagination metadata returned with every editor listing.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageMeta {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    pub fn new(pagination: Pagination, total_items: i64) -> Self {
        let (page, limit) = pagination.clamped();
        let total_pages = if total_items == 0 {
            0
        } else {
            (total_items + limit - 1) / limit
        };
        Self {
            current_page: page,
            total_pages,
            total_items,
            has_next: page < total_pages,
            has_prev: page > 1 && total_items > 0,
        }
    }
}

/// A page of results plus its metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(AppError::Validation(format!(
                "Unknown sort direction: {}",
                other
            ))),
        }
    }
}

/// Caller-chosen sort field for editor content listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSortField {
    CreatedAt,
    UpdatedAt,
    TitleEn,
    DisplayOrder,
    ContentType,
}

impl ContentSortField {
    /// Column expression for ORDER BY. Values are fixed identifiers, never
    /// caller-supplied strings.
    pub fn as_sql(&self) -> &'static str {
        match self {
            ContentSortField::CreatedAt => "created_at",
            ContentSortField::UpdatedAt => "updated_at",
            ContentSortField::TitleEn => "title->>'en'",
            ContentSortField::DisplayOrder => "display_order",
            ContentSortField::ContentType => "content_type",
        }
    }
}

impl FromStr for ContentSortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(ContentSortField::CreatedAt),
            "updated_at" => Ok(ContentSortField::UpdatedAt),
            "title_en" => Ok(ContentSortField::TitleEn),
            "display_order" => Ok(ContentSortField::DisplayOrder),
            "content_type" => Ok(ContentSortField::ContentType),
            other => Err(AppError::Validation(format!(
                "Unknown sort field: {}",
                other
            ))),
        }
    }
}

/// Caller-chosen sort field for editor song listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SongSortField {
    CreatedAt,
    UpdatedAt,
    TitleEn,
    DisplayOrder,
}

impl SongSortField {
    /// Column expression for ORDER BY. Values are fixed identifiers, never
    /// caller-supplied strings.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SongSortField::CreatedAt => "created_at",
            SongSortField::UpdatedAt => "updated_at",
            SongSortField::TitleEn => "title->>'en'",
            SongSortField::DisplayOrder => "display_order",
        }
    }
}

impl FromStr for SongSortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(SongSortField::CreatedAt),
            "updated_at" => Ok(SongSortField::UpdatedAt),
            "title_en" => Ok(SongSortField::TitleEn),
            "display_order" => Ok(SongSortField::DisplayOrder),
            other => Err(AppError::Validation(format!(
                "Unknown sort field: {}",
                other
            ))),
        }
    }
}

/// Editor listing filter for content items.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditorContentFilter {
    pub content_type: Option<ContentType>,
    pub is_active: Option<bool>,
    /// Case-insensitive substring match against title.en, description.en,
    /// key, and tags.
    pub search: Option<String>,
    pub sort: Option<ContentSortField>,
    pub direction: Option<SortDirection>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Visitor content query: one language, optional type/featured narrowing.
#[derive(Debug, Clone, Copy)]
pub struct VisitorContentQuery {
    pub language: LanguageCode,
    pub content_type: Option<ContentType>,
    pub featured_only: bool,
}

/// Editor listing filter for songs. Same shape as the content filter: the
/// song store offers the sort surface its columns support.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditorSongFilter {
    pub is_active: Option<bool>,
    pub genre: Option<String>,
    pub search: Option<String>,
    pub sort: Option<SongSortField>,
    pub direction: Option<SortDirection>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Visitor song query.
#[derive(Debug, Clone)]
pub struct VisitorSongQuery {
    pub language: LanguageCode,
    pub featured_only: bool,
    pub genre: Option<String>,
    pub limit: Option<i64>,
}

/// Media ledger listing filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaAssetFilter {
    pub category: Option<crate::models::AssetCategory>,
    pub resource_kind: Option<crate::models::ResourceKind>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// One (id, order) pair of a bulk reorder batch.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReorderUpdate {
    pub id: Uuid,
    pub order: i32,
}

/// Aggregate outcome of an atomic bulk reorder. Pairs referencing nonexistent
/// ids simply do not match; no per-item failure is surfaced.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ReorderOutcome {
    pub matched_count: i64,
    pub modified_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    // The song listing takes the same caller-chosen sort surface as content;
    // every field name round-trips through FromStr to a fixed column.
    #[test]
    fn song_sort_fields_map_to_fixed_columns() {
        for (name, column) in [
            ("created_at", "created_at"),
            ("updated_at", "updated_at"),
            ("title_en", "title->>'en'"),
            ("display_order", "display_order"),
        ] {
            let field: SongSortField = name.parse().unwrap();
            assert_eq!(field.as_sql(), column);
        }
        assert!("play_count".parse::<SongSortField>().is_err());
    }

    #[test]
    fn pagination_clamps_limit_to_range() {
        let (_, limit) = Pagination { page: 1, limit: 500 }.clamped();
        assert_eq!(limit, MAX_PAGE_SIZE);
        let (_, limit) = Pagination { page: 1, limit: 0 }.clamped();
        assert_eq!(limit, MIN_PAGE_SIZE);
        let (page, _) = Pagination { page: -3, limit: 10 }.clamped();
        assert_eq!(page, 1);
    }

    #[test]
    fn page_meta_computes_boundaries() {
        let meta = PageMeta::new(Pagination { page: 2, limit: 10 }, 35);
        assert_eq!(
            meta,
            PageMeta {
                current_page: 2,
                total_pages: 4,
                total_items: 35,
                has_next: true,
                has_prev: true,
            }
        );

        let first = PageMeta::new(Pagination { page: 1, limit: 10 }, 35);
        assert!(!first.has_prev);
        assert!(first.has_next);

        let last = PageMeta::new(Pagination { page: 4, limit: 10 }, 35);
        assert!(last.has_prev);
        assert!(!last.has_next);
    }

    #[test]
    fn page_meta_empty_result() {
        let meta = PageMeta::new(Pagination::default(), 0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn offset_reflects_clamped_values() {
        assert_eq!(Pagination { page: 3, limit: 10 }.offset(), 20);
        assert_eq!(Pagination { page: 1, limit: 10 }.offset(), 0);
    }
}
