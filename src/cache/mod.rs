pub mod entry;
pub mod keys;
pub mod memory;

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, CacheBackendKind, MAX_TTL_SECS};
use crate::firestore::{Document, FirestoreClient, FirestoreError};

pub use entry::CacheEntry;
pub use memory::MemoryStore;

/// Firestore collection holding keyed cache documents.
pub const CACHE_COLLECTION: &str = "cache";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("document store error: {0}")]
    Documents(#[from] FirestoreError),

    #[error("cache payload codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("unexpected cache state: {0}")]
    Unexpected(String),
}

#[derive(Clone)]
enum Backend {
    Redis(ConnectionManager),
    Documents(FirestoreClient),
    Memory(MemoryStore),
}

/// Time-bounded key/value store in front of the upstream APIs, plus an
/// append-only list used for analytics events.
///
/// Every backend persists a [`CacheEntry`]; freshness is decided here from
/// the entry timestamp so all backends expire identically.
#[derive(Clone)]
pub struct CacheStore {
    backend: Backend,
    ttl: Duration,
}

/// Analytics lists keep at most this many items unless configured otherwise.
pub const DEFAULT_MAX_LIST_LEN: usize = 1000;

impl CacheStore {
    pub fn redis(conn: ConnectionManager, ttl_secs: u64) -> Self {
        Self::with_backend(Backend::Redis(conn), ttl_secs)
    }

    pub fn documents(client: FirestoreClient, ttl_secs: u64) -> Self {
        Self::with_backend(Backend::Documents(client), ttl_secs)
    }

    pub fn memory(ttl_secs: u64) -> Self {
        Self::with_backend(Backend::Memory(MemoryStore::new()), ttl_secs)
    }

    fn with_backend(backend: Backend, ttl_secs: u64) -> Self {
        let secs = i64::try_from(ttl_secs.min(MAX_TTL_SECS)).unwrap_or_default();
        Self {
            backend,
            ttl: Duration::seconds(secs),
        }
    }

    /// Build the backend selected by `CACHE_BACKEND`.
    pub async fn connect(config: &AppConfig, http: reqwest::Client) -> anyhow::Result<Self> {
        let store = match config.cache_backend {
            CacheBackendKind::Redis => {
                let client = redis::Client::open(config.redis_url.as_str())?;
                let conn = ConnectionManager::new(client).await?;
                info!(url = %config.redis_url, "connected to redis");
                Self::redis(conn, config.cache_ttl_secs)
            }
            CacheBackendKind::Firestore => {
                let client = FirestoreClient::from_config(http, config).ok_or_else(|| {
                    anyhow::anyhow!("CACHE_BACKEND=firestore requires FIREBASE_PROJECT_ID")
                })?;
                info!("using firestore document cache");
                Self::documents(client, config.document_cache_ttl_secs)
            }
            CacheBackendKind::Memory => {
                info!("using in-process memory cache");
                Self::memory(config.cache_ttl_secs)
            }
        };
        if let Err(e) = store.ping().await {
            warn!(backend = store.backend_name(), error = %e, "cache store unreachable, serving uncached");
        }
        Ok(store)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Redis(_) => "redis",
            Backend::Documents(_) => "firestore",
            Backend::Memory(_) => "memory",
        }
    }

    /// Raw entry for `key`, fresh or not.
    pub async fn get_entry(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        match &self.backend {
            Backend::Redis(conn) => {
                let mut conn = conn.clone();
                let raw: Option<String> = conn.get(key).await?;
                raw.map(|s| serde_json::from_str(&s))
                    .transpose()
                    .map_err(CacheError::from)
            }
            Backend::Documents(client) => {
                let doc = client.get_document(CACHE_COLLECTION, key).await?;
                doc.map(|d| entry_from_document(&d)).transpose()
            }
            Backend::Memory(store) => Ok(store.get(key).await),
        }
    }

    /// Write `entry` as-is, keeping its timestamp.
    pub async fn put_entry(&self, key: &str, entry: &CacheEntry) -> Result<(), CacheError> {
        match &self.backend {
            Backend::Redis(conn) => {
                let mut conn = conn.clone();
                let payload = serde_json::to_string(entry)?;
                let ttl = u64::try_from(self.ttl.num_seconds()).unwrap_or(0).max(1);
                conn.set_ex::<_, _, ()>(key, payload, ttl).await?;
            }
            Backend::Documents(client) => {
                client
                    .set_document(CACHE_COLLECTION, key, &entry_to_fields(entry)?)
                    .await?;
            }
            Backend::Memory(store) => store.put(key, entry.clone()).await,
        }
        Ok(())
    }

    /// Fresh payload for `key`, or `None` when absent or stale.
    pub async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let entry = self.get_entry(key).await?;
        Ok(entry.filter(|e| e.is_fresh(self.ttl)).map(|e| e.data))
    }

    pub async fn set(&self, key: &str, data: Value) -> Result<(), CacheError> {
        self.put_entry(key, &CacheEntry::new(data)).await
    }

    /// Read-through helper: serve a fresh cached value or run `fetch` and
    /// store its result.
    ///
    /// Cache failures never fail the request; they are logged and the
    /// upstream is used directly. Errors from `fetch` propagate unchanged and
    /// nothing is written.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.get(key).await {
            Ok(Some(value)) => match serde_json::from_value::<T>(value) {
                Ok(hit) => {
                    metrics::counter!("cache_hits_total").increment(1);
                    debug!(key, "cache hit");
                    return Ok(hit);
                }
                Err(e) => {
                    metrics::counter!("cache_errors_total").increment(1);
                    warn!(key, error = %e, "cached payload has an unexpected shape, refetching");
                }
            },
            Ok(None) => {
                metrics::counter!("cache_misses_total").increment(1);
                debug!(key, "cache miss");
            }
            Err(e) => {
                metrics::counter!("cache_errors_total").increment(1);
                warn!(key, error = %e, "cache read failed, fetching upstream");
            }
        }

        let fresh = fetch().await?;

        let stored = match serde_json::to_value(&fresh) {
            Ok(value) => self.set(key, value).await,
            Err(e) => Err(CacheError::from(e)),
        };
        if let Err(e) = stored {
            metrics::counter!("cache_errors_total").increment(1);
            warn!(key, error = %e, "cache write failed");
        }

        Ok(fresh)
    }

    /// Round-trip to the backing store.
    pub async fn ping(&self) -> Result<(), CacheError> {
        match &self.backend {
            Backend::Redis(conn) => {
                let mut conn = conn.clone();
                let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
                if pong != "PONG" {
                    return Err(CacheError::Unexpected(format!("PING answered {pong}")));
                }
            }
            Backend::Documents(client) => {
                client.get_document(CACHE_COLLECTION, "__ping").await?;
            }
            Backend::Memory(_) => {}
        }
        Ok(())
    }

    /// Prepend `value` to the list at `key`, keeping the newest `max_len`
    /// items. Document collections are not trimmed.
    pub async fn push_list(
        &self,
        key: &str,
        value: &Value,
        max_len: usize,
    ) -> Result<(), CacheError> {
        let max_len = max_len.max(1);
        match &self.backend {
            Backend::Redis(conn) => {
                let mut conn = conn.clone();
                let stop = isize::try_from(max_len).unwrap_or(isize::MAX) - 1;
                let (): () = redis::pipe()
                    .atomic()
                    .lpush(key, serde_json::to_string(value)?)
                    .ignore()
                    .ltrim(key, 0, stop)
                    .ignore()
                    .query_async(&mut conn)
                    .await?;
            }
            Backend::Documents(client) => {
                let entry = CacheEntry::new(value.clone());
                client.create_document(key, &entry_to_fields(&entry)?).await?;
            }
            Backend::Memory(store) => store.push_front(key, value.clone(), max_len).await,
        }
        Ok(())
    }

    /// Up to `limit` most recently pushed list items, newest first.
    pub async fn recent_list(&self, key: &str, limit: usize) -> Result<Vec<Value>, CacheError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        match &self.backend {
            Backend::Redis(conn) => {
                let mut conn = conn.clone();
                let stop = isize::try_from(limit).unwrap_or(isize::MAX) - 1;
                let raw: Vec<String> = conn.lrange(key, 0, stop).await?;
                raw.iter()
                    .map(|s| serde_json::from_str(s).map_err(CacheError::from))
                    .collect()
            }
            Backend::Documents(client) => {
                let docs = client.run_query(key, "timestamp", limit).await?;
                docs.iter()
                    .map(|d| entry_from_document(d).map(|e| e.data))
                    .collect()
            }
            Backend::Memory(store) => Ok(store.range(key, limit).await),
        }
    }
}

/// Documents store the payload as a JSON string so arbitrary nesting
/// survives Firestore's value model.
fn entry_to_fields(entry: &CacheEntry) -> Result<Map<String, Value>, CacheError> {
    let mut fields = Map::new();
    fields.insert("data".into(), json!(serde_json::to_string(&entry.data)?));
    fields.insert("timestamp".into(), json!(entry.timestamp.to_rfc3339()));
    Ok(fields)
}

fn entry_from_document(doc: &Document) -> Result<CacheEntry, CacheError> {
    let data = match doc.field("data") {
        Some(Value::String(raw)) => serde_json::from_str(&raw)?,
        Some(other) => other,
        None => {
            return Err(CacheError::Unexpected(format!(
                "document {} has no data field",
                doc.id()
            )))
        }
    };
    let timestamp = doc
        .field("timestamp")
        .and_then(|v| v.as_str().map(str::to_owned))
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|t| t.with_timezone(&Utc))
        .ok_or_else(|| {
            CacheError::Unexpected(format!("document {} has no valid timestamp", doc.id()))
        })?;
    Ok(CacheEntry::written_at(data, timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_memory_get_respects_ttl() {
        let cache = CacheStore::memory(300);
        let stale = CacheEntry::written_at(json!([1]), Utc::now() - Duration::seconds(301));
        cache.put_entry("protocols", &stale).await.unwrap();

        assert!(cache.get("protocols").await.unwrap().is_none());
        assert!(cache.get_entry("protocols").await.unwrap().is_some());

        cache.set("protocols", json!([2])).await.unwrap();
        assert_eq!(cache.get("protocols").await.unwrap(), Some(json!([2])));
    }

    #[tokio::test]
    async fn test_get_or_fetch_serves_hits_without_fetching() {
        let cache = CacheStore::memory(300);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let got: Result<Vec<u32>, CacheError> = cache
                .get_or_fetch("k", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2, 3])
                })
                .await;
            assert_eq!(got.unwrap(), vec![1, 2, 3]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_fetch_does_not_store_failures() {
        let cache = CacheStore::memory(300);

        let failed: Result<Vec<u32>, String> =
            cache.get_or_fetch("k", || async { Err("boom".to_string()) }).await;
        assert_eq!(failed.unwrap_err(), "boom");
        assert!(cache.get_entry("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_list_is_newest_first() {
        let cache = CacheStore::memory(300);
        for i in 0..5 {
            cache
                .push_list("events", &json!({"n": i}), DEFAULT_MAX_LIST_LEN)
                .await
                .unwrap();
        }

        let recent = cache.recent_list("events", 3).await.unwrap();
        assert_eq!(recent, vec![json!({"n": 4}), json!({"n": 3}), json!({"n": 2})]);
        assert!(cache.recent_list("events", 0).await.unwrap().is_empty());
        assert!(cache.recent_list("missing", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_list_is_capped() {
        let cache = CacheStore::memory(300);
        for i in 0..10 {
            cache.push_list("events", &json!(i), 4).await.unwrap();
        }

        let all = cache.recent_list("events", 100).await.unwrap();
        assert_eq!(all, vec![json!(9), json!(8), json!(7), json!(6)]);
    }

    #[test]
    fn test_huge_ttl_is_clamped() {
        let year = Duration::seconds(365 * 24 * 60 * 60);
        assert_eq!(CacheStore::memory(10_000_000_000_000_000).ttl(), year);
        assert_eq!(CacheStore::memory(u64::MAX).ttl(), year);

        assert_eq!(CacheStore::memory(300).ttl(), Duration::seconds(300));
    }

    #[tokio::test]
    async fn test_get_or_fetch_replaces_wrong_shape() {
        let cache = CacheStore::memory(300);
        cache.set("k", json!("not a list")).await.unwrap();

        let got: Result<Vec<u32>, CacheError> =
            cache.get_or_fetch("k", || async { Ok(vec![1, 2]) }).await;
        assert_eq!(got.unwrap(), vec![1, 2]);
        assert_eq!(cache.get("k").await.unwrap(), Some(json!([1, 2])));
    }

    #[test]
    fn test_document_encoding_roundtrip() {
        let entry = CacheEntry::written_at(
            json!({"chains": [["a", 1]]}),
            "2024-05-01T12:00:00Z".parse().unwrap(),
        );
        let fields = entry_to_fields(&entry).unwrap();
        let doc = Document {
            name: "projects/p/databases/(default)/documents/cache/k".into(),
            fields: crate::firestore::value::fields_from_json(&fields),
            ..Default::default()
        };
        assert_eq!(entry_from_document(&doc).unwrap(), entry);
    }
}
