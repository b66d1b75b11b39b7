use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::json_or_null;

use lingora_core::models::{
    CreateSongInput, EditorSongFilter, Page, PageMeta, ResolvedSong, Song, SongRow, SongSortField,
    SortDirection, UpdateSongInput, VisitorSongQuery,
};
use lingora_core::AppError;

/// Repository for songs. Play counts only move through [`increment_play_count`];
/// normal updates cannot touch them.
///
/// [`increment_play_count`]: SongRepository::increment_play_count
#[derive(Clone)]
pub struct SongRepository {
    pool: PgPool,
}

impl SongRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a song. `title.en` and a positive duration are mandatory.
    #[tracing::instrument(skip(self, input), fields(db.table = "songs", db.operation = "insert"))]
    pub async fn create(
        &self,
        input: CreateSongInput,
        actor: Option<&str>,
    ) -> Result<Song, AppError> {
        if !input.title.has_english() {
            return Err(AppError::Validation(
                "title.en is required to create a song".to_string(),
            ));
        }
        if input.duration_seconds <= 0 {
            return Err(AppError::Validation(
                "duration_seconds must be positive".to_string(),
            ));
        }

        let row = sqlx::query_as::<Postgres, SongRow>(
            r#"
            INSERT INTO songs (
                id, title, description, artist, lyrics,
                audio_url, audio_asset_id, duration_seconds,
                cover_image, genre, release_year,
                display_order, is_active, is_featured, play_count,
                created_by, last_modified_by, created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5,
                $6, $7, $8,
                $9, $10, $11,
                $12, $13, $14, 0,
                $15, $15, NOW(), NOW()
            )
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(json_or_null(&input.title))
        .bind(json_or_null(&input.description))
        .bind(json_or_null(&input.artist))
        .bind(json_or_null(&input.lyrics))
        .bind(&input.audio_url)
        .bind(input.audio_asset_id)
        .bind(input.duration_seconds)
        .bind(input.cover_image)
        .bind(&input.genre)
        .bind(input.release_year)
        .bind(input.metadata.order)
        .bind(input.metadata.is_active)
        .bind(input.metadata.is_featured)
        .bind(actor)
        .fetch_one(&self.pool)
        .await?;
        row.into_song()
    }

    #[tracing::instrument(skip(self), fields(db.table = "songs", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Song, AppError> {
        let row = sqlx::query_as::<Postgres, SongRow>("SELECT * FROM songs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Song {} not found", id)))?;
        row.into_song()
    }

    /// Apply a partial update. Localized bags merge per-language; the update
    /// surface has no play-count field.
    #[tracing::instrument(skip(self, input), fields(db.table = "songs", db.operation = "update", db.record_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateSongInput,
        actor: Option<&str>,
    ) -> Result<Song, AppError> {
        if let Some(duration) = input.duration_seconds {
            if duration <= 0 {
                return Err(AppError::Validation(
                    "duration_seconds must be positive".to_string(),
                ));
            }
        }

        let row = sqlx::query_as::<Postgres, SongRow>("SELECT * FROM songs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Song {} not found", id)))?;
        let mut song = row.into_song()?;
        song.apply_update(input);

        let row = sqlx::query_as::<Postgres, SongRow>(
            r#"
            UPDATE songs
            SET title = $2, description = $3, artist = $4, lyrics = $5,
                audio_url = $6, audio_asset_id = $7, duration_seconds = $8,
                cover_image = $9, genre = $10, release_year = $11,
                display_order = $12, is_active = $13, is_featured = $14,
                last_modified_by = COALESCE($15, last_modified_by),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(json_or_null(&song.title))
        .bind(json_or_null(&song.description))
        .bind(json_or_null(&song.artist))
        .bind(json_or_null(&song.lyrics))
        .bind(&song.audio_url)
        .bind(song.audio_asset_id)
        .bind(song.duration_seconds)
        .bind(song.cover_image)
        .bind(&song.genre)
        .bind(song.release_year)
        .bind(song.metadata.order)
        .bind(song.metadata.is_active)
        .bind(song.metadata.is_featured)
        .bind(actor)
        .fetch_one(&self.pool)
        .await?;
        row.into_song()
    }

    #[tracing::instrument(skip(self), fields(db.table = "songs", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM songs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Song {} not found", id)));
        }
        Ok(())
    }

    /// Atomic play-count increment in a single statement; concurrent plays
    /// never lose counts. Returns the new count.
    #[tracing::instrument(skip(self), fields(db.table = "songs", db.operation = "update", db.record_id = %id))]
    pub async fn increment_play_count(&self, id: Uuid) -> Result<i64, AppError> {
        let play_count = sqlx::query_scalar::<Postgres, i64>(
            r#"
            UPDATE songs
            SET play_count = play_count + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING play_count
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Song {} not found", id)))?;
        Ok(play_count)
    }

    /// Editor listing: filter by active/genre, free-text search across
    /// title.en and artist.en, caller-chosen sort, paginated.
    #[tracing::instrument(skip(self, filter), fields(db.table = "songs", db.operation = "select"))]
    pub async fn list_for_editor(&self, filter: &EditorSongFilter) -> Result<Page<Song>, AppError> {
        let (_, limit) = filter.pagination.clamped();
        let offset = filter.pagination.offset();
        let sort = filter.sort.unwrap_or(SongSortField::CreatedAt);
        let direction = filter.direction.unwrap_or(match sort {
            SongSortField::CreatedAt | SongSortField::UpdatedAt => SortDirection::Desc,
            _ => SortDirection::Asc,
        });
        let pattern = filter.search.as_ref().map(|s| format!("%{}%", s));

        const FILTER_CLAUSE: &str = r#"
            WHERE ($1::boolean IS NULL OR is_active = $1)
              AND ($2::text IS NULL OR genre = $2)
              AND ($3::text IS NULL
                   OR title->>'en' ILIKE $3
                   OR artist->>'en' ILIKE $3)
        "#;

        // Sort column and direction come from fixed enums, never caller text.
        let sql = format!(
            "SELECT * FROM songs {} ORDER BY {} {} LIMIT $4 OFFSET $5",
            FILTER_CLAUSE,
            sort.as_sql(),
            direction.as_sql()
        );
        let rows = sqlx::query_as::<Postgres, SongRow>(&sql)
            .bind(filter.is_active)
            .bind(&filter.genre)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM songs {}", FILTER_CLAUSE);
        let total: i64 = sqlx::query_scalar::<Postgres, i64>(&count_sql)
            .bind(filter.is_active)
            .bind(&filter.genre)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(SongRow::into_song)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            meta: PageMeta::new(filter.pagination, total),
        })
    }

    /// Visitor listing: active songs resolved to one language, display order
    /// then newest first, optional genre/featured narrowing and limit.
    #[tracing::instrument(skip(self), fields(db.table = "songs", db.operation = "select"))]
    pub async fn list_for_visitor(
        &self,
        query: &VisitorSongQuery,
    ) -> Result<Vec<ResolvedSong>, AppError> {
        let rows = sqlx::query_as::<Postgres, SongRow>(
            r#"
            SELECT * FROM songs
            WHERE is_active = TRUE
              AND (NOT $1 OR is_featured = TRUE)
              AND ($2::text IS NULL OR genre = $2)
            ORDER BY display_order ASC, created_at DESC
            LIMIT $3
            "#,
        )
        .bind(query.featured_only)
        .bind(&query.genre)
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let song = row.into_song()?;
                Ok(ResolvedSong::from_song(&song, query.language))
            })
            .collect()
    }
}
