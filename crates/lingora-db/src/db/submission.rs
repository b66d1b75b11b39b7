use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use validator::Validate;

use lingora_core::models::{CreateQuerySubmission, Page, PageMeta, Pagination, QuerySubmission};
use lingora_core::AppError;

/// Repository for visitor query submissions. Persistence comes first;
/// notification delivery is a separate fire-and-forget concern layered on
/// top by the service.
#[derive(Clone)]
pub struct QuerySubmissionRepository {
    pool: PgPool,
}

impl QuerySubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "query_submissions", db.operation = "insert"))]
    pub async fn create(&self, input: CreateQuerySubmission) -> Result<QuerySubmission, AppError> {
        input.validate()?;

        let submission = sqlx::query_as::<Postgres, QuerySubmission>(
            r#"
            INSERT INTO query_submissions (id, name, email, subject, message, submitted_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.subject)
        .bind(&input.message)
        .fetch_one(&self.pool)
        .await?;
        Ok(submission)
    }

    #[tracing::instrument(skip(self), fields(db.table = "query_submissions", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<QuerySubmission, AppError> {
        sqlx::query_as::<Postgres, QuerySubmission>(
            "SELECT * FROM query_submissions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Submission {} not found", id)))
    }

    /// Newest submissions first, paginated.
    #[tracing::instrument(skip(self), fields(db.table = "query_submissions", db.operation = "select"))]
    pub async fn list(&self, pagination: Pagination) -> Result<Page<QuerySubmission>, AppError> {
        let (_, limit) = pagination.clamped();
        let offset = pagination.offset();

        let items = sqlx::query_as::<Postgres, QuerySubmission>(
            "SELECT * FROM query_submissions ORDER BY submitted_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM query_submissions")
            .fetch_one(&self.pool)
            .await?;

        Ok(Page {
            items,
            meta: PageMeta::new(pagination, total),
        })
    }
}
