use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A cached payload and the moment it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(data: Value) -> Self {
        Self::written_at(data, Utc::now())
    }

    pub fn written_at(data: Value, timestamp: DateTime<Utc>) -> Self {
        Self { data, timestamp }
    }

    /// An entry is stale once its age exceeds `ttl`; an age of exactly `ttl`
    /// still counts as fresh.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.timestamp <= ttl
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.is_fresh_at(Utc::now(), ttl)
    }
}
