pub mod api;
pub mod cache;
pub mod config;
pub mod defillama;
pub mod errors;
pub mod firestore;
pub mod insights;
pub mod lido;
pub mod metrics;
pub mod models;
pub mod server;
pub mod services;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::cache::CacheStore;
use crate::config::AppConfig;
use crate::firestore::FirestoreClient;
use crate::services::MarketData;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub cache: CacheStore,
    pub market: MarketData,
    /// Present when a Firebase project is configured.
    pub documents: Option<FirestoreClient>,
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: AppConfig, cache: CacheStore, http: reqwest::Client) -> Self {
        let market = MarketData::from_config(&config, http.clone(), cache.clone());
        let documents = FirestoreClient::from_config(http, &config);
        Self {
            config,
            cache,
            market,
            documents,
            metrics_handle: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }
}

/// Shared outbound HTTP client.
pub fn http_client() -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
