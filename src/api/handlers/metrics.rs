use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;

use crate::errors::AppError;
use crate::AppState;

pub async fn render(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let handle = state
        .metrics_handle
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Metrics are not enabled".into()))?;
    let body = handle.render();
    Ok(([(CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
