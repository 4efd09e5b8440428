use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::api::extract::AppQuery;
use crate::errors::AppError;
use crate::models::{AggregatedData, ChartData, TrackedChain};
use crate::AppState;

const DEFAULT_HISTORY_DAYS: u32 = 90;
const MAX_HISTORY_DAYS: u32 = 3650;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<u32>,
}

fn tracked(chain: &str) -> Result<TrackedChain, AppError> {
    TrackedChain::from_name(chain)
        .ok_or_else(|| AppError::BadRequest(format!("Unsupported chain: {chain}")))
}

pub async fn summary(
    State(state): State<AppState>,
    Path(chain): Path<String>,
) -> Result<Json<AggregatedData>, AppError> {
    let chain = tracked(&chain)?;
    let data = state
        .market
        .aggregated(chain)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch aggregated data", e))?;
    Ok(Json(data))
}

pub async fn historical(
    State(state): State<AppState>,
    Path(chain): Path<String>,
    AppQuery(query): AppQuery<HistoryQuery>,
) -> Result<Json<ChartData>, AppError> {
    let chain = tracked(&chain)?;
    let days = query.days.unwrap_or(DEFAULT_HISTORY_DAYS);
    if days == 0 || days > MAX_HISTORY_DAYS {
        return Err(AppError::BadRequest(format!(
            "days must be between 1 and {MAX_HISTORY_DAYS}"
        )));
    }

    let data = state
        .market
        .historical(chain, days)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch historical data", e))?;
    Ok(Json(data))
}
