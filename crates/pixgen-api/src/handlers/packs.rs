//! Prompt pack catalog.

use axum::extract::State;
use axum::Json;
use pixgen_models::Pack;
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cover_url: String,
}

impl From<Pack> for PackSummary {
    fn from(pack: Pack) -> Self {
        Self {
            id: pack.id,
            name: pack.name,
            description: pack.description,
            cover_url: pack.cover_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListPacksResponse {
    pub packs: Vec<PackSummary>,
}

/// GET /pack/bulk
///
/// The catalog is public reference data, no authentication required.
pub async fn list_packs(State(state): State<AppState>) -> ApiResult<Json<ListPacksResponse>> {
    let packs = state.store.packs().list_all().await?;
    Ok(Json(ListPacksResponse {
        packs: packs.into_iter().map(PackSummary::from).collect(),
    }))
}
