use axum::extract::State;
use axum::Json;

use crate::api::extract::AppQuery;
use crate::errors::AppError;
use crate::insights::ListQuery;
use crate::models::{FeeTrendPoint, ProtocolFee};
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<Vec<ProtocolFee>>, AppError> {
    let rows = state
        .market
        .fees()
        .await
        .map_err(|e| AppError::upstream("Failed to fetch fees data", e))?;
    Ok(Json(query.apply(rows)?))
}

pub async fn history(State(state): State<AppState>) -> Result<Json<Vec<FeeTrendPoint>>, AppError> {
    let points = state
        .market
        .fee_history()
        .await
        .map_err(|e| AppError::upstream("Failed to fetch fee history", e))?;
    Ok(Json(points))
}
