use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::extract::{AppJson, AppQuery};
use crate::errors::AppError;
use crate::models::{AnalyticsEvent, AnalyticsEventInput};
use crate::AppState;

const DEFAULT_EVENT_LIMIT: usize = 50;
const MAX_EVENT_LIMIT: usize = 500;

/// Accept one dashboard event and append it to the events list.
pub async fn ingest(
    State(state): State<AppState>,
    AppJson(input): AppJson<AnalyticsEventInput>,
) -> Result<Json<Value>, AppError> {
    if input.event.trim().is_empty() {
        return Err(AppError::BadRequest("event is required".into()));
    }

    let event = AnalyticsEvent::record(input);
    let payload = serde_json::to_value(&event).map_err(anyhow::Error::from)?;
    state
        .cache
        .push_list(
            &state.config.analytics_events_key,
            &payload,
            state.config.analytics_max_events,
        )
        .await?;

    metrics::counter!("analytics_events_total", "event" => event.event.clone()).increment(1);
    tracing::info!(
        id = %event.id,
        event = %event.event,
        data = %event.data,
        "analytics event received"
    );

    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

/// Most recent events, newest first.
pub async fn recent(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<RecentQuery>,
) -> Result<Json<Vec<Value>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_EVENT_LIMIT).min(MAX_EVENT_LIMIT);
    let events = state
        .cache
        .recent_list(&state.config.analytics_events_key, limit)
        .await?;
    Ok(Json(events))
}
