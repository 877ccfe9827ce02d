//! Trained model repository.

use chrono::{DateTime, Utc};
use pixgen_models::{JobStatus, ModelAttributes, TrainedModel};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{Row, SqliteConnection};

use crate::StoreError;

/// Durable records of personalization models, keyed by internal id and
/// by the provider's training request id.
#[derive(Clone)]
pub struct TrainedModelRepository {
    pool: SqlitePool,
}

impl TrainedModelRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a pending model row inside an open transaction.
    pub async fn insert_in(
        conn: &mut SqliteConnection,
        model: &TrainedModel,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO trained_models
                (id, user_id, name, model_type, age, ethnicity, eye_color, bald,
                 asset_url, request_id, artifact_path, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&model.id)
        .bind(&model.user_id)
        .bind(&model.name)
        .bind(model.attributes.model_type.as_str())
        .bind(model.attributes.age as i64)
        .bind(model.attributes.ethnicity.as_str())
        .bind(model.attributes.eye_color.as_str())
        .bind(model.attributes.bald)
        .bind(&model.asset_url)
        .bind(&model.request_id)
        .bind(&model.artifact_path)
        .bind(model.status.as_str())
        .bind(model.created_at)
        .bind(model.updated_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn create(&self, model: &TrainedModel) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        Self::insert_in(&mut conn, model).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<TrainedModel>, StoreError> {
        let row = sqlx::query("SELECT * FROM trained_models WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| model_from_row(&r)).transpose()
    }

    pub async fn find_by_request_id(
        &self,
        request_id: &str,
    ) -> Result<Option<TrainedModel>, StoreError> {
        let row = sqlx::query("SELECT * FROM trained_models WHERE request_id = ?1")
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| model_from_row(&r)).transpose()
    }

    /// Record a successful training completion: one transition from
    /// `pending` to `generated`, writing the artifact path.
    ///
    /// Returns `false` when no pending row matched the request id, so
    /// duplicate callbacks are visible to the caller as no-ops.
    pub async fn mark_trained(
        &self,
        request_id: &str,
        artifact_path: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE trained_models
            SET status = 'generated', artifact_path = ?1, updated_at = ?2
            WHERE request_id = ?3 AND status = 'pending'
            "#,
        )
        .bind(artifact_path)
        .bind(Utc::now())
        .bind(request_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Record a failed training run; same idempotency contract as
    /// [`Self::mark_trained`].
    pub async fn mark_failed(&self, request_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE trained_models
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

    /// All of a user's models, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<TrainedModel>, StoreError> {
        let rows =
            sqlx::query("SELECT * FROM trained_models WHERE user_id = ?1 ORDER BY created_at DESC")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        rows.iter().map(model_from_row).collect()
    }
}

fn model_from_row(row: &SqliteRow) -> Result<TrainedModel, StoreError> {
    let decode = |what: &str, value: &str| StoreError::Decode(format!("{what}: {value}"));

    let model_type: String = row.try_get("model_type")?;
    let ethnicity: String = row.try_get("ethnicity")?;
    let eye_color: String = row.try_get("eye_color")?;
    let status: String = row.try_get("status")?;
    let age: i64 = row.try_get("age")?;

    Ok(TrainedModel {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        attributes: ModelAttributes {
            model_type: model_type
                .parse()
                .map_err(|_| decode("model_type", &model_type))?,
            age: u8::try_from(age).map_err(|_| decode("age", &age.to_string()))?,
            ethnicity: ethnicity
                .parse()
                .map_err(|_| decode("ethnicity", &ethnicity))?,
            eye_color: eye_color
                .parse()
                .map_err(|_| decode("eye_color", &eye_color))?,
            bald: row.try_get("bald")?,
        },
        asset_url: row.try_get("asset_url")?,
        request_id: row.try_get("request_id")?,
        artifact_path: row.try_get("artifact_path")?,
        status: status
            .parse::<JobStatus>()
            .map_err(|_| decode("status", &status))?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;
    use pixgen_models::{Ethnicity, EyeColor, ModelType};

    pub(crate) fn sample_model(user_id: &str, request_id: &str) -> TrainedModel {
        let now = Utc::now();
        TrainedModel {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: "studio portrait".to_string(),
            attributes: ModelAttributes {
                model_type: ModelType::Man,
                age: 28,
                ethnicity: Ethnicity::SouthAsian,
                eye_color: EyeColor::Brown,
                bald: true,
            },
            asset_url: "https://cdn.example.com/archive.zip".to_string(),
            request_id: request_id.to_string(),
            artifact_path: None,
            status: JobStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_roundtrip() {
        let store = Store::in_memory().await.unwrap();
        let repo = store.models();
        let model = sample_model("u-1", "req-1");
        repo.create(&model).await.unwrap();

        let found = repo.find_by_id(&model.id).await.unwrap().unwrap();
        assert_eq!(found.user_id, "u-1");
        assert_eq!(found.attributes, model.attributes);
        assert_eq!(found.status, JobStatus::Pending);
        assert!(found.artifact_path.is_none());

        let by_handle = repo.find_by_request_id("req-1").await.unwrap().unwrap();
        assert_eq!(by_handle.id, model.id);
    }

    #[tokio::test]
    async fn test_duplicate_request_id_rejected() {
        let store = Store::in_memory().await.unwrap();
        let repo = store.models();
        repo.create(&sample_model("u-1", "req-1")).await.unwrap();

        let err = repo
            .create(&sample_model("u-2", "req-1"))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_mark_trained_transitions_once() {
        let store = Store::in_memory().await.unwrap();
        let repo = store.models();
        repo.create(&sample_model("u-1", "req-1")).await.unwrap();

        assert!(repo.mark_trained("req-1", "loras/a.safetensors").await.unwrap());
        // Second delivery is a no-op.
        assert!(!repo.mark_trained("req-1", "loras/b.safetensors").await.unwrap());

        let model = repo.find_by_request_id("req-1").await.unwrap().unwrap();
        assert_eq!(model.status, JobStatus::Generated);
        assert_eq!(model.artifact_path.as_deref(), Some("loras/a.safetensors"));
    }

    #[tokio::test]
    async fn test_mark_failed_unknown_handle_is_noop() {
        let store = Store::in_memory().await.unwrap();
        assert!(!store.models().mark_failed("missing").await.unwrap());
    }
}
