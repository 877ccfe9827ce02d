//! Generated image repository.

use chrono::{DateTime, Utc};
use pixgen_models::{GeneratedImage, JobStatus};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};

use crate::StoreError;

/// Default page size for image listings.
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Read-side filter for [`GeneratedImageRepository::list_for_user`].
#[derive(Debug, Clone, Default)]
pub struct ImageListQuery {
    /// Restrict to these image ids; empty means all of the user's images.
    pub ids: Vec<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Durable records of generation jobs, keyed by internal id and by the
/// provider's unique request id.
#[derive(Clone)]
pub struct GeneratedImageRepository {
    pool: SqlitePool,
}

impl GeneratedImageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a pending image row inside an open transaction.
    pub async fn insert_in(
        conn: &mut SqliteConnection,
        image: &GeneratedImage,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO generated_images
                (id, user_id, model_id, prompt, request_id, image_url, status,
                 created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&image.id)
        .bind(&image.user_id)
        .bind(&image.model_id)
        .bind(&image.prompt)
        .bind(&image.request_id)
        .bind(&image.image_url)
        .bind(image.status.as_str())
        .bind(image.created_at)
        .bind(image.updated_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn create(&self, image: &GeneratedImage) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        Self::insert_in(&mut conn, image).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<GeneratedImage>, StoreError> {
        let row = sqlx::query("SELECT * FROM generated_images WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| image_from_row(&r)).transpose()
    }

    pub async fn find_by_request_id(
        &self,
        request_id: &str,
    ) -> Result<Option<GeneratedImage>, StoreError> {
        let row = sqlx::query("SELECT * FROM generated_images WHERE request_id = ?1")
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| image_from_row(&r)).transpose()
    }

    /// Record a successful generation: one transition from `pending` to
    /// `generated`, writing the result URL. Returns `false` when no
    /// pending row matched (unknown handle or already terminal).
    pub async fn mark_generated(
        &self,
        request_id: &str,
        image_url: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE generated_images
            SET status = 'generated', image_url = ?1, updated_at = ?2
            WHERE request_id = ?3 AND status = 'pending'
            "#,
        )
        .bind(image_url)
        .bind(Utc::now())
        .bind(request_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Record a failed generation; same idempotency contract as
    /// [`Self::mark_generated`].
    pub async fn mark_failed(&self, request_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE generated_images
            SET status = 'failed', updated_at = ?1
            WHERE request_id = ?2 AND status = 'pending'
            "#,
        )
        .bind(Utc::now())
        .bind(request_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// List a user's images, newest first, excluding failed rows.
    ///
    /// The failed-row exclusion is the read contract listing consumers
    /// expect; failed jobs remain queryable by id for reconciliation.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        query: &ImageListQuery,
    ) -> Result<Vec<GeneratedImage>, StoreError> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM generated_images WHERE user_id = ");
        builder.push_bind(user_id);
        builder.push(" AND status != 'failed'");

        if !query.ids.is_empty() {
            builder.push(" AND id IN (");
            let mut ids = builder.separated(", ");
            for id in &query.ids {
                ids.push_bind(id);
            }
            builder.push(")");
        }

        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(query.limit.unwrap_or(DEFAULT_LIST_LIMIT).max(0));
        builder.push(" OFFSET ");
        builder.push_bind(query.offset.unwrap_or(0).max(0));

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(image_from_row).collect()
    }
}

fn image_from_row(row: &SqliteRow) -> Result<GeneratedImage, StoreError> {
    let status: String = row.try_get("status")?;
    Ok(GeneratedImage {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        model_id: row.try_get("model_id")?,
        prompt: row.try_get("prompt")?,
        request_id: row.try_get("request_id")?,
        image_url: row.try_get("image_url")?,
        status: status
            .parse::<JobStatus>()
            .map_err(|_| StoreError::Decode(format!("status: {status}")))?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}
