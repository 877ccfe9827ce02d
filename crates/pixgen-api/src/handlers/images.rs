//! Image listing.

use axum::extract::{Query, State};
use axum::Json;
use pixgen_models::GeneratedImage;
use pixgen_store::ImageListQuery;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListImagesParams {
    /// Comma-separated image ids to fetch; omit for the full listing.
    pub ids: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSummary {
    pub id: String,
    pub model_id: String,
    pub prompt: String,
    pub image_url: String,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<GeneratedImage> for ImageSummary {
    fn from(image: GeneratedImage) -> Self {
        Self {
            id: image.id,
            model_id: image.model_id,
            prompt: image.prompt,
            image_url: image.image_url,
            status: image.status.as_str().to_string(),
            created_at: image.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListImagesResponse {
    pub images: Vec<ImageSummary>,
}

/// GET /image/bulk
///
/// Scoped to the caller; failed rows are excluded by the store's read
/// contract.
pub async fn list_images(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListImagesParams>,
) -> ApiResult<Json<ListImagesResponse>> {
    let ids = params
        .ids
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let query = ImageListQuery {
        ids,
        limit: params.limit,
        offset: params.offset,
    };
    let images = state.store.images().list_for_user(&user.uid, &query).await?;
    Ok(Json(ListImagesResponse {
        images: images.into_iter().map(ImageSummary::from).collect(),
    }))
}
