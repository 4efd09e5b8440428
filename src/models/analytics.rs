use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Request body of `POST /api/analytics`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsEventInput {
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// A stored analytics event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub id: Uuid,
    pub event: String,
    #[serde(default)]
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn record(input: AnalyticsEventInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            event: input.event,
            data: input.data,
            timestamp: Utc::now(),
        }
    }
}
