//! Image generation submission, single and pack-batch.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageRequest {
    #[validate(length(min = 1))]
    pub model_id: String,
    #[validate(length(min = 1, max = 2000))]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageResponse {
    pub image_id: String,
}

/// POST /ai/generate
pub async fn generate_image(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<GenerateImageRequest>, JsonRejection>,
) -> ApiResult<Json<GenerateImageResponse>> {
    let Json(req) = body.map_err(|e| ApiError::validation(e.body_text()))?;
    req.validate()?;

    let image_id = state
        .orchestrator
        .generate_image(&user.uid, &req.model_id, &req.prompt)
        .await?;
    crate::metrics::record_images_submitted(1);

    Ok(Json(GenerateImageResponse { image_id }))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePackRequest {
    #[validate(length(min = 1))]
    pub pack_id: String,
    #[validate(length(min = 1))]
    pub model_id: String,
}

#[derive(Debug, Serialize)]
pub struct GeneratePackResponse {
    pub images: Vec<String>,
}

/// POST /pack/generate
pub async fn generate_from_pack(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<GeneratePackRequest>, JsonRejection>,
) -> ApiResult<Json<GeneratePackResponse>> {
    let Json(req) = body.map_err(|e| ApiError::validation(e.body_text()))?;
    req.validate()?;

    let images = state
        .orchestrator
        .generate_from_pack(&user.uid, &req.pack_id, &req.model_id)
        .await?;
    crate::metrics::record_images_submitted(images.len() as u64);

    Ok(Json(GeneratePackResponse { images }))
}
