use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::json_or_null;

use lingora_core::models::{
    ContentGroup, ContentItem, ContentRow, ContentSortField, CreateContentInput,
    EditorContentFilter, Page, PageMeta, ReorderOutcome, ReorderUpdate, ResolvedContent,
    SortDirection, UpdateContentInput, VisitorContentQuery,
};
use lingora_core::validation::{derive_key, validate_key, KEY_MAX_LEN};
use lingora_core::{AppError, LanguageCode};

/// How many characters of a derived key survive before the disambiguation
/// suffix. Leaves room for `_` plus eight hex characters within the 50-char
/// key limit.
const DERIVED_KEY_STEM_LEN: usize = KEY_MAX_LEN - 9;

/// Repository for content items: localized page sections addressed by a
/// unique slug key.
#[derive(Clone)]
pub struct ContentRepository {
    pool: PgPool,
}

impl ContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a content item. `title.en` is mandatory. An editor-supplied key
    /// is validated and must be unique; a missing key is derived from
    /// `title.en` and disambiguated with a random suffix if taken.
    #[tracing::instrument(skip(self, input), fields(db.table = "content_items", db.operation = "insert"))]
    pub async fn create(
        &self,
        input: CreateContentInput,
        actor: Option<&str>,
    ) -> Result<ContentItem, AppError> {
        if !input.title.has_english() {
            return Err(AppError::Validation(
                "title.en is required to create content".to_string(),
            ));
        }

        match input.key.clone() {
            Some(key) => {
                validate_key(&key)?;
                let row = self.insert_row(&input, &key, actor).await.map_err(|e| {
                    AppError::conflict_on_unique(
                        e,
                        format!("Content with key '{}' already exists", key),
                    )
                })?;
                row.into_item()
            }
            None => {
                let base = derive_key(input.title.resolve(LanguageCode::En));
                match self.insert_row(&input, &base, actor).await {
                    Ok(row) => row.into_item(),
                    Err(e) if is_unique_violation(&e) => {
                        // Derived keys are best-effort; collide with an
                        // existing item and the new one gets a random suffix
                        // rather than a rejection.
                        let suffixed = suffixed_key(&base);
                        tracing::debug!(
                            base_key = %base,
                            key = %suffixed,
                            "Derived key taken, retrying with suffix"
                        );
                        let row = self.insert_row(&input, &suffixed, actor).await?;
                        row.into_item()
                    }
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    async fn insert_row(
        &self,
        input: &CreateContentInput,
        key: &str,
        actor: Option<&str>,
    ) -> Result<ContentRow, sqlx::Error> {
        let title = json_or_null(&input.title);
        let description = json_or_null(&input.description);
        let subtitle = json_or_null(&input.subtitle);
        let media = input.media.as_ref().map(json_or_null);
        let seo = input.seo.as_ref().map(json_or_null);

        sqlx::query_as::<Postgres, ContentRow>(
            r#"
            INSERT INTO content_items (
                id, key, content_type, title, description, subtitle,
                image_url, video_url, media,
                display_order, is_active, is_featured, tags, category, seo,
                created_by, last_modified_by,
                created_at, updated_at, published_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6,
                $7, $8, $9,
                $10, $11, $12, $13, $14, $15,
                $16, $16,
                NOW(), NOW(), NOW()
            )
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(key)
        .bind(input.content_type)
        .bind(title)
        .bind(description)
        .bind(subtitle)
        .bind(&input.image_url)
        .bind(&input.video_url)
        .bind(media)
        .bind(input.metadata.order)
        .bind(input.metadata.is_active)
        .bind(input.metadata.is_featured)
        .bind(&input.metadata.tags)
        .bind(&input.metadata.category)
        .bind(seo)
        .bind(actor)
        .fetch_one(&self.pool)
        .await
    }

    #[tracing::instrument(skip(self), fields(db.table = "content_items", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<ContentItem, AppError> {
        let row = sqlx::query_as::<Postgres, ContentRow>(
            "SELECT * FROM content_items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {} not found", id)))?;
        row.into_item()
    }

    #[tracing::instrument(skip(self), fields(db.table = "content_items", db.operation = "select"))]
    pub async fn get_by_key(&self, key: &str) -> Result<ContentItem, AppError> {
        let row = sqlx::query_as::<Postgres, ContentRow>(
            "SELECT * FROM content_items WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content with key '{}' not found", key)))?;
        row.into_item()
    }

    /// Apply a partial update. Omitted fields stay untouched; localized bags
    /// merge per-language. A changed key is re-validated and must still be
    /// unique.
    #[tracing::instrument(skip(self, input), fields(db.table = "content_items", db.operation = "update", db.record_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateContentInput,
        actor: Option<&str>,
    ) -> Result<ContentItem, AppError> {
        let row = sqlx::query_as::<Postgres, ContentRow>(
            "SELECT * FROM content_items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {} not found", id)))?;
        let mut item = row.into_item()?;

        if let Some(key) = &input.key {
            if *key != item.key {
                validate_key(key)?;
            }
        }
        item.apply_update(input);

        let title = json_or_null(&item.title);
        let description = json_or_null(&item.description);
        let subtitle = json_or_null(&item.subtitle);
        let media = item.media.as_ref().map(json_or_null);
        let seo = item.seo.as_ref().map(json_or_null);
        let key = item.key.clone();

        let row = sqlx::query_as::<Postgres, ContentRow>(
            r#"
            UPDATE content_items
            SET key = $2, content_type = $3,
                title = $4, description = $5, subtitle = $6,
                image_url = $7, video_url = $8, media = $9,
                display_order = $10, is_active = $11, is_featured = $12,
                tags = $13, category = $14, seo = $15,
                last_modified_by = COALESCE($16, last_modified_by),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&key)
        .bind(item.content_type)
        .bind(title)
        .bind(description)
        .bind(subtitle)
        .bind(&item.image_url)
        .bind(&item.video_url)
        .bind(media)
        .bind(item.metadata.order)
        .bind(item.metadata.is_active)
        .bind(item.metadata.is_featured)
        .bind(&item.metadata.tags)
        .bind(&item.metadata.category)
        .bind(seo)
        .bind(actor)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::conflict_on_unique(e, format!("Content with key '{}' already exists", key))
        })?;
        row.into_item()
    }

    /// Hard delete. Referenced media assets are left alone; dangling ledger
    /// references never block a delete.
    #[tracing::instrument(skip(self), fields(db.table = "content_items", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM content_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Content {} not found", id)));
        }
        Ok(())
    }

    /// Editor listing: filter by type/active, free-text search across
    /// title.en, description.en, key, and tags, caller-chosen sort, paginated.
    #[tracing::instrument(skip(self, filter), fields(db.table = "content_items", db.operation = "select"))]
    pub async fn list_for_editor(
        &self,
        filter: &EditorContentFilter,
    ) -> Result<Page<ContentItem>, AppError> {
        let (_, limit) = filter.pagination.clamped();
        let offset = filter.pagination.offset();
        let sort = filter.sort.unwrap_or(ContentSortField::DisplayOrder);
        let direction = filter.direction.unwrap_or(match sort {
            ContentSortField::CreatedAt | ContentSortField::UpdatedAt => SortDirection::Desc,
            _ => SortDirection::Asc,
        });
        let pattern = filter.search.as_ref().map(|s| format!("%{}%", s));

        const FILTER_CLAUSE: &str = r#"
            WHERE ($1::content_type IS NULL OR content_type = $1)
              AND ($2::boolean IS NULL OR is_active = $2)
              AND ($3::text IS NULL
                   OR title->>'en' ILIKE $3
                   OR description->>'en' ILIKE $3
                   OR key ILIKE $3
                   OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE $3))
        "#;

        // Sort column and direction come from fixed enums, never caller text.
        let sql = format!(
            "SELECT * FROM content_items {} ORDER BY {} {} LIMIT $4 OFFSET $5",
            FILTER_CLAUSE,
            sort.as_sql(),
            direction.as_sql()
        );
        let rows = sqlx::query_as::<Postgres, ContentRow>(&sql)
            .bind(filter.content_type)
            .bind(filter.is_active)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM content_items {}", FILTER_CLAUSE);
        let total: i64 = sqlx::query_scalar::<Postgres, i64>(&count_sql)
            .bind(filter.content_type)
            .bind(filter.is_active)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(ContentRow::into_item)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            meta: PageMeta::new(filter.pagination, total),
        })
    }

    /// Visitor listing: active items only, resolved to one language, grouped
    /// by content type in first-seen order of `display_order ASC,
    /// published_at DESC`.
    #[tracing::instrument(skip(self), fields(db.table = "content_items", db.operation = "select"))]
    pub async fn list_for_visitor(
        &self,
        query: VisitorContentQuery,
    ) -> Result<Vec<ContentGroup>, AppError> {
        let rows = sqlx::query_as::<Postgres, ContentRow>(
            r#"
            SELECT * FROM content_items
            WHERE is_active = TRUE
              AND ($1::content_type IS NULL OR content_type = $1)
              AND (NOT $2 OR is_featured = TRUE)
            ORDER BY display_order ASC, published_at DESC
            "#,
        )
        .bind(query.content_type)
        .bind(query.featured_only)
        .fetch_all(&self.pool)
        .await?;

        let mut groups: Vec<ContentGroup> = Vec::new();
        for row in rows {
            let item = row.into_item()?;
            let resolved = ResolvedContent::from_item(&item, query.language);
            match groups
                .iter_mut()
                .find(|g| g.content_type == item.content_type)
            {
                Some(group) => group.items.push(resolved),
                None => groups.push(ContentGroup {
                    content_type: item.content_type,
                    items: vec![resolved],
                }),
            }
        }
        Ok(groups)
    }

    /// Visitor lookup of a single active item by key, resolved to one
    /// language. The key format is checked before touching the database.
    #[tracing::instrument(skip(self), fields(db.table = "content_items", db.operation = "select"))]
    pub async fn get_by_key_for_visitor(
        &self,
        key: &str,
        language: LanguageCode,
    ) -> Result<ResolvedContent, AppError> {
        validate_key(key)?;
        let row = sqlx::query_as::<Postgres, ContentRow>(
            "SELECT * FROM content_items WHERE key = $1 AND is_active = TRUE",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content with key '{}' not found", key)))?;
        let item = row.into_item()?;
        Ok(ResolvedContent::from_item(&item, language))
    }

    /// Atomically apply a batch of (id, display_order) pairs in one
    /// statement: either all matching pairs take effect or none do. Pairs for
    /// nonexistent ids simply do not match; rows already at the requested
    /// order count as matched but not modified.
    #[tracing::instrument(skip(self, updates), fields(db.table = "content_items", db.operation = "update", batch_size = updates.len()))]
    pub async fn bulk_reorder(
        &self,
        updates: &[ReorderUpdate],
        actor: Option<&str>,
    ) -> Result<ReorderOutcome, AppError> {
        if updates.is_empty() {
            return Ok(ReorderOutcome {
                matched_count: 0,
                modified_count: 0,
            });
        }
        let ids: Vec<Uuid> = updates.iter().map(|u| u.id).collect();
        let orders: Vec<i32> = updates.iter().map(|u| u.order).collect();

        let (matched_count, modified_count) = sqlx::query_as::<Postgres, (i64, i64)>(
            r#"
            WITH input AS (
                SELECT * FROM UNNEST($1::uuid[], $2::int[]) AS t(id, new_order)
            ),
            changed AS (
                UPDATE content_items c
                SET display_order = i.new_order,
                    last_modified_by = COALESCE($3, c.last_modified_by),
                    updated_at = NOW()
                FROM input i
                WHERE c.id = i.id
                  AND c.display_order IS DISTINCT FROM i.new_order
                RETURNING c.id
            )
            SELECT
                (SELECT COUNT(DISTINCT c.id) FROM input i JOIN content_items c ON c.id = i.id),
                (SELECT COUNT(*) FROM changed)
            "#,
        )
        .bind(&ids)
        .bind(&orders)
        .bind(actor)
        .fetch_one(&self.pool)
        .await?;

        Ok(ReorderOutcome {
            matched_count,
            modified_count,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
}

fn suffixed_key(base: &str) -> String {
    let stem: String = base.chars().take(DERIVED_KEY_STEM_LEN).collect();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}", stem, &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffixed_key_stays_within_length_and_format() {
        let base = "a".repeat(KEY_MAX_LEN);
        let key = suffixed_key(&base);
        assert!(key.len() <= KEY_MAX_LEN);
        assert!(validate_key(&key).is_ok());
    }

    #[test]
    fn suffixed_keys_differ_between_calls() {
        assert_ne!(suffixed_key("welcome"), suffixed_key("welcome"));
        assert!(suffixed_key("welcome").starts_with("welcome_"));
    }
}
