use axum::extract::State;
use axum::Json;

use crate::errors::AppError;
use crate::models::LiquidStakingPlatform;
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<LiquidStakingPlatform>>, AppError> {
    let platforms = state
        .market
        .liquid_staking()
        .await
        .map_err(|e| AppError::upstream("Failed to fetch liquid staking platforms", e))?;
    Ok(Json(platforms))
}
