//! Model training submission and listing.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use pixgen_models::{Ethnicity, EyeColor, ModelAttributes, ModelType, TrainedModel};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrainModelRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    #[validate(range(min = 1, max = 120))]
    pub age: u8,
    pub ethnicity: Ethnicity,
    pub eye_color: EyeColor,
    #[serde(default)]
    pub bald: bool,
    #[validate(url)]
    pub zip_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainModelResponse {
    pub model_id: String,
}

/// POST /ai/training
pub async fn train_model(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<TrainModelRequest>, JsonRejection>,
) -> ApiResult<Json<TrainModelResponse>> {
    let Json(req) = body.map_err(|e| ApiError::validation(e.body_text()))?;
    req.validate()?;

    let attributes = ModelAttributes {
        model_type: req.model_type,
        age: req.age,
        ethnicity: req.ethnicity,
        eye_color: req.eye_color,
        bald: req.bald,
    };

    let model_id = state
        .orchestrator
        .train_model(&user.uid, req.name, req.zip_url, attributes)
        .await?;
    crate::metrics::record_training_submitted();

    Ok(Json(TrainModelResponse { model_id }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub attributes: ModelAttributes,
    pub status: String,
    pub ready: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<TrainedModel> for ModelSummary {
    fn from(model: TrainedModel) -> Self {
        let ready = model.is_ready();
        Self {
            id: model.id,
            name: model.name,
            attributes: model.attributes,
            status: model.status.as_str().to_string(),
            ready,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListModelsResponse {
    pub models: Vec<ModelSummary>,
}

/// GET /models
pub async fn list_models(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ListModelsResponse>> {
    let models = state.store.models().list_for_user(&user.uid).await?;
    Ok(Json(ListModelsResponse {
        models: models.into_iter().map(ModelSummary::from).collect(),
    }))
}
