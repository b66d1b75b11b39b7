use std::sync::Arc;

use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use lingora_core::models::{
    AssetCategory, MediaAsset, MediaAssetFilter, MediaAssetRow, OptimizedVariant, Page, PageMeta,
    ResourceKind,
};
use lingora_core::AppError;
use lingora_storage::{DerivedRendition, ObjectStorage, StoredObject};

use super::json_or_null;

/// Aggregate view of the active ledger for the operator console.
#[derive(Debug, Clone, serde::Serialize, PartialEq, Eq)]
pub struct MediaLedgerStats {
    pub total_assets: i64,
    pub total_bytes: i64,
    pub images: i64,
    pub videos: i64,
    pub audio: i64,
}

/// Repository for the media asset ledger.
///
/// The ledger only records objects that were successfully pushed to the
/// storage collaborator; there is never a row without a physical object
/// behind it. The reverse inconsistency (an orphaned physical object after a
/// failed remove) is accepted and only logged.
#[derive(Clone)]
pub struct MediaAssetRepository {
    pool: PgPool,
    storage: Arc<dyn ObjectStorage>,
}

impl MediaAssetRepository {
    pub fn new(pool: PgPool, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { pool, storage }
    }

    /// Record a ledger row for an object the storage collaborator has already
    /// accepted. Renditions reported with the push are recorded inline.
    #[tracing::instrument(skip(self, stored), fields(db.table = "media_assets", db.operation = "insert", storage_id = %stored.storage_id))]
    pub async fn record_pushed(
        &self,
        stored: &StoredObject,
        mime_type: &str,
        size_bytes: i64,
        kind: ResourceKind,
        category: AssetCategory,
        uploaded_by: Option<&str>,
    ) -> Result<MediaAsset, AppError> {
        let variants: Vec<OptimizedVariant> = stored.derived.iter().map(to_variant).collect();

        let row = sqlx::query_as::<Postgres, MediaAssetRow>(
            r#"
            INSERT INTO media_assets (
                id, storage_id, url, secure_url, mime_type, size_bytes,
                resource_kind, width, height, duration_seconds, category,
                usage_count, last_used_at, optimized_variants,
                uploaded_by, is_active, created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6,
                $7, $8, $9, $10, $11,
                0, NULL, $12,
                $13, TRUE, NOW(), NOW()
            )
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&stored.storage_id)
        .bind(&stored.url)
        .bind(&stored.secure_url)
        .bind(mime_type)
        .bind(size_bytes)
        .bind(kind)
        .bind(stored.width)
        .bind(stored.height)
        .bind(stored.duration_seconds)
        .bind(category)
        .bind(json_or_null(&variants))
        .bind(uploaded_by)
        .fetch_one(&self.pool)
        .await?;
        row.into_asset()
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<MediaAsset, AppError> {
        let row = sqlx::query_as::<Postgres, MediaAssetRow>(
            "SELECT * FROM media_assets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Media asset {} not found", id)))?;
        row.into_asset()
    }

    /// Editor listing of active ledger rows, newest first.
    #[tracing::instrument(skip(self, filter), fields(db.table = "media_assets", db.operation = "select"))]
    pub async fn list(&self, filter: &MediaAssetFilter) -> Result<Page<MediaAsset>, AppError> {
        let (_, limit) = filter.pagination.clamped();
        let offset = filter.pagination.offset();

        const FILTER_CLAUSE: &str = r#"
            WHERE is_active = TRUE
              AND ($1::asset_category IS NULL OR category = $1)
              AND ($2::resource_kind IS NULL OR resource_kind = $2)
        "#;

        let sql = format!(
            "SELECT * FROM media_assets {} ORDER BY created_at DESC LIMIT $3 OFFSET $4",
            FILTER_CLAUSE
        );
        let rows = sqlx::query_as::<Postgres, MediaAssetRow>(&sql)
            .bind(filter.category)
            .bind(filter.resource_kind)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM media_assets {}", FILTER_CLAUSE);
        let total: i64 = sqlx::query_scalar::<Postgres, i64>(&count_sql)
            .bind(filter.category)
            .bind(filter.resource_kind)
            .fetch_one(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(MediaAssetRow::into_asset)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            meta: PageMeta::new(filter.pagination, total),
        })
    }

    /// Visitor-facing listing. Usage accounting for the returned assets is
    /// batched into one update and detached from the read: it can neither
    /// slow it down nor fail it.
    #[tracing::instrument(skip(self, filter), fields(db.table = "media_assets", db.operation = "select"))]
    pub async fn list_for_visitor(
        &self,
        filter: &MediaAssetFilter,
    ) -> Result<Page<MediaAsset>, AppError> {
        let page = self.list(filter).await?;

        let ids: Vec<Uuid> = page.items.iter().map(|a| a.id).collect();
        if !ids.is_empty() {
            let repo = self.clone();
            tokio::spawn(async move {
                if let Err(e) = repo.record_usage(&ids).await {
                    tracing::warn!(error = %e, "Usage accounting update failed");
                }
            });
        }
        Ok(page)
    }

    /// Batched usage accounting: one statement for the whole id set.
    #[tracing::instrument(skip(self, ids), fields(db.table = "media_assets", db.operation = "update", batch_size = ids.len()))]
    pub async fn record_usage(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            r#"
            UPDATE media_assets
            SET usage_count = usage_count + 1, last_used_at = NOW(), updated_at = NOW()
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Merge late-arriving derived renditions into an existing ledger row.
    /// Renditions match by label: same label replaces, new labels append.
    /// A second report for an asset never creates a second row.
    #[tracing::instrument(skip(self, renditions), fields(db.table = "media_assets", db.operation = "update", db.record_id = %id))]
    pub async fn merge_renditions(
        &self,
        id: Uuid,
        renditions: &[DerivedRendition],
    ) -> Result<MediaAsset, AppError> {
        let asset = self.get(id).await?;

        let mut variants = asset.optimized_variants;
        for rendition in renditions {
            let variant = to_variant(rendition);
            match variants.iter_mut().find(|v| v.label == variant.label) {
                Some(existing) => *existing = variant,
                None => variants.push(variant),
            }
        }

        let row = sqlx::query_as::<Postgres, MediaAssetRow>(
            r#"
            UPDATE media_assets
            SET optimized_variants = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(json_or_null(&variants))
        .fetch_one(&self.pool)
        .await?;
        row.into_asset()
    }

    /// Aggregate counts and byte totals over active ledger rows.
    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "select"))]
    pub async fn stats(&self) -> Result<MediaLedgerStats, AppError> {
        let (total_assets, total_bytes, images, videos, audio) =
            sqlx::query_as::<Postgres, (i64, i64, i64, i64, i64)>(
                r#"
                SELECT COUNT(*),
                       COALESCE(SUM(size_bytes), 0)::bigint,
                       COUNT(*) FILTER (WHERE resource_kind = 'image'),
                       COUNT(*) FILTER (WHERE resource_kind = 'video'),
                       COUNT(*) FILTER (WHERE resource_kind = 'audio')
                FROM media_assets
                WHERE is_active = TRUE
                "#,
            )
            .fetch_one(&self.pool)
            .await?;
        Ok(MediaLedgerStats {
            total_assets,
            total_bytes,
            images,
            videos,
            audio,
        })
    }

    /// Delete an asset: deactivate the row, attempt the physical removal,
    /// then drop the row. A failed removal is logged and otherwise ignored;
    /// the orphaned object is the accepted inconsistency.
    #[tracing::instrument(skip(self), fields(db.table = "media_assets", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let asset = self.get(id).await?;

        sqlx::query("UPDATE media_assets SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if let Err(e) = self
            .storage
            .remove(&asset.storage_id, asset.resource_kind)
            .await
        {
            tracing::warn!(
                storage_id = %asset.storage_id,
                error = %e,
                "Physical object removal failed, leaving orphan behind"
            );
        }

        sqlx::query("DELETE FROM media_assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn to_variant(rendition: &DerivedRendition) -> OptimizedVariant {
    OptimizedVariant {
        label: rendition.label.clone(),
        url: rendition.url.clone(),
        width: rendition.width,
        height: rendition.height,
    }
}
