use axum::extract::{Path, State};
use axum::Json;

use crate::api::extract::AppQuery;
use crate::errors::AppError;
use crate::insights::ListQuery;
use crate::models::{Chain, ChainDetail};
use crate::AppState;

/// All chains, optionally filtered with `?chain=<name>`.
pub async fn list(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<Vec<Chain>>, AppError> {
    let chains = state
        .market
        .chains()
        .await
        .map_err(|e| AppError::upstream("Failed to fetch chain data", e))?;
    Ok(Json(query.apply(chains)?))
}

/// One chain merged with its protocol list.
pub async fn detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ChainDetail>, AppError> {
    let label = display_name(&name);
    match state.market.chain_detail(&name).await {
        Ok(Some(detail)) => Ok(Json(detail)),
        Ok(None) => Err(AppError::NotFound(format!("{label} data not found"))),
        Err(e) => Err(AppError::upstream(format!("Failed to fetch {label} data"), e)),
    }
}

/// `solana` becomes `Solana`.
fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
