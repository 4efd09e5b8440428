use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use super::entry::CacheEntry;

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    lists: HashMap<String, VecDeque<Value>>,
}

/// Process-local store used for tests and single-instance development.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        self.inner.read().await.entries.get(key).cloned()
    }

    pub async fn put(&self, key: &str, entry: CacheEntry) {
        self.inner.write().await.entries.insert(key.to_owned(), entry);
    }

    /// Prepend `value`, dropping the oldest items past `max_len`.
    pub async fn push_front(&self, key: &str, value: Value, max_len: usize) {
        let mut inner = self.inner.write().await;
        let list = inner.lists.entry(key.to_owned()).or_default();
        list.push_front(value);
        list.truncate(max_len);
    }

    pub async fn range(&self, key: &str, limit: usize) -> Vec<Value> {
        self.inner
            .read()
            .await
            .lists
            .get(key)
            .map(|list| list.iter().take(limit).cloned().collect())
            .unwrap_or_default()
    }
}
