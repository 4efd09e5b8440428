use axum::extract::State;
use axum::Json;

use crate::api::extract::AppQuery;
use crate::errors::AppError;
use crate::insights::ListQuery;
use crate::models::Protocol;
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<Vec<Protocol>>, AppError> {
    let protocols = state
        .market
        .protocols()
        .await
        .map_err(|e| AppError::upstream("Failed to fetch protocols", e))?;
    Ok(Json(query.apply(protocols)?))
}
