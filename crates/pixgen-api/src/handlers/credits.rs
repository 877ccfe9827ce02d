//! Credit balance lookup.

use axum::extract::State;
use axum::Json;
use pixgen_models::Credits;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: Credits,
}

/// GET /credits
pub async fn get_balance(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<BalanceResponse>> {
    let balance = state.store.ledger().get_balance(&user.uid).await?;
    Ok(Json(BalanceResponse { balance }))
}
