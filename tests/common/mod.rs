use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use defi_dashboard::cache::CacheStore;
use defi_dashboard::config::{AppConfig, CacheBackendKind, FirebaseConfig};
use defi_dashboard::AppState;

/// Request counters for the fake upstream, shared with the test.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct UpstreamHits {
    pub protocols: Arc<AtomicUsize>,
    pub chains: Arc<AtomicUsize>,
    pub documents: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl UpstreamHits {
    pub fn protocols(&self) -> usize {
        self.protocols.load(Ordering::SeqCst)
    }

    pub fn chains(&self) -> usize {
        self.chains.load(Ordering::SeqCst)
    }

    pub fn documents(&self) -> usize {
        self.documents.load(Ordering::SeqCst)
    }
}

/// A running fake upstream on an ephemeral port.
#[allow(dead_code)]
pub struct FakeUpstream {
    pub base_url: String,
    pub hits: UpstreamHits,
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// DeFi data provider
// ---------------------------------------------------------------------------

#[allow(dead_code)]
pub fn protocols_fixture() -> Value {
    json!([
        {"id": "182", "name": "Lido", "chain": "Ethereum", "chains": ["Ethereum"],
         "category": "Liquid Staking", "tvl": 30.0e9, "chainTvls": {"Ethereum": 30.0e9},
         "change_1h": 0.1, "change_1d": 1.0, "change_7d": 2.0, "change_1m": 4.0, "mcap": 2.0e9},
        {"id": "111", "name": "Aave", "chain": "Multi-Chain", "chains": ["Ethereum", "Polygon"],
         "category": "Lending", "tvl": 20.0e9, "chainTvls": {"Ethereum": 18.0e9, "Polygon": 2.0e9},
         "change_1d": -1.0, "change_7d": 3.0, "mcap": 3.0e9},
        {"id": "900", "name": "Rocket Pool", "chain": "Ethereum", "chains": ["Ethereum"],
         "category": "Liquid Staking", "tvl": 3.0e9, "chainTvls": {"Ethereum": 3.0e9},
         "change_1h": 0.3, "change_1d": 0.5, "change_7d": -1.0, "change_1m": 2.0},
        {"id": "2000", "name": "Jito", "chain": "Solana", "chains": ["Solana"],
         "category": "Liquid Staking", "tvl": 2.0e9, "chainTvls": {"Solana": 2.0e9},
         "change_1d": 4.0},
        {"id": "214", "name": "Raydium", "chain": "Solana", "chains": ["Solana"],
         "category": "Dexes", "tvl": 1.5e9, "chainTvls": {"Solana": 1.5e9}},
        {"id": "3000", "name": "Dust Staking", "chain": "Ethereum", "chains": ["Ethereum"],
         "category": "Liquid Staking", "tvl": 0.0}
    ])
}

async fn protocols(State(state): State<ProviderState>) -> Json<Value> {
    state.hits.protocols.fetch_add(1, Ordering::SeqCst);
    Json(protocols_fixture())
}

#[allow(dead_code)]
pub fn chains_fixture() -> Value {
    json!([
        {"gecko_id": "ethereum", "name": "Ethereum", "tokenSymbol": "ETH", "tvl": 60.0e9,
         "change_24h": 1.2, "change_7d": 3.4, "protocols": 1200},
        {"gecko_id": "solana", "name": "Solana", "tokenSymbol": "SOL", "tvl": 8.0e9,
         "change_24h": -0.5, "protocols": 180},
        {"gecko_id": "matic-network", "name": "Polygon", "tokenSymbol": "POL", "tvl": 1.0e9},
        {"gecko_id": "ghost", "name": "Ghost", "tvl": null}
    ])
}

#[derive(Clone)]
struct ProviderState {
    hits: UpstreamHits,
    chains: Arc<Value>,
}

async fn chains(State(state): State<ProviderState>) -> Json<Value> {
    state.hits.chains.fetch_add(1, Ordering::SeqCst);
    Json(state.chains.as_ref().clone())
}

async fn chain_market_caps() -> Json<Value> {
    Json(json!([
        {"gecko_id": "ethereum", "mcap": 400.0e9},
        {"gecko_id": "solana", "mcap": 80.0e9},
        {"gecko_id": "matic-network", "mcap": 5.0e9}
    ]))
}

async fn chain_history(Path(_chain): Path<String>) -> Json<Value> {
    let now = Utc::now();
    let day = |ago: i64| (now - Duration::days(ago)).timestamp().to_string();
    Json(json!([
        {"date": day(200), "totalLiquidityUSD": 50.0e9},
        {"date": day(10), "totalLiquidityUSD": 90.0e9},
        {"date": day(5), "totalLiquidityUSD": null},
        {"date": day(1), "totalLiquidityUSD": 100.0e9}
    ]))
}

async fn fees_overview() -> Json<Value> {
    Json(json!({
        "protocols": [
            {"name": "Lido", "category": "Liquid Staking", "chains": ["Ethereum"],
             "total24h": 100.0, "total7d": 700.0, "total30d": 3000.0, "totalAllTime": 90000.0},
            {"name": "Uniswap", "category": "Dexes", "chains": ["Ethereum", "Arbitrum"],
             "total24h": 400.0, "total7d": 2800.0, "total30d": 12000.0, "totalAllTime": 1.0e6},
            {"name": "Aave V3", "category": "Lending", "chains": ["Ethereum"], "total24h": 50.0}
        ],
        "totalDataChart": [[1714608000, 200.0], [1714521600, 100.0]]
    }))
}

async fn current_price(Path(coin): Path<String>) -> Json<Value> {
    Json(json!({
        "coins": { coin: {"price": 3000.0, "symbol": "ETH", "confidence": 0.99} }
    }))
}

async fn lido_apr() -> Json<Value> {
    Json(json!({"data": {"smaApr": 3.2}}))
}

async fn lido_withdrawal_time() -> Json<Value> {
    Json(json!({
        "data": {"estimatedTimeSeconds": 172800.0, "queuedEth": 5000.0, "queueLength": 42.0}
    }))
}

/// Serves the DeFi data, price and Lido endpoints from one base URL.
#[allow(dead_code)]
pub async fn spawn_upstream() -> FakeUpstream {
    spawn_upstream_with_chains(chains_fixture()).await
}

/// Same provider, serving `chains_payload` from `/v2/chains`.
#[allow(dead_code)]
pub async fn spawn_upstream_with_chains(chains_payload: Value) -> FakeUpstream {
    let hits = UpstreamHits::default();
    let state = ProviderState {
        hits: hits.clone(),
        chains: Arc::new(chains_payload),
    };
    let router = Router::new()
        .route("/protocols", get(protocols))
        .route("/v2/chains", get(chains))
        .route("/v2/chains/market-cap", get(chain_market_caps))
        .route("/charts/:chain", get(chain_history))
        .route("/overview/fees", get(fees_overview))
        .route("/prices/current/:coin", get(current_price))
        .route("/v1/protocol/steth/apr/sma", get(lido_apr))
        .route("/v2/request-time/calculate", get(lido_withdrawal_time))
        .with_state(state);

    FakeUpstream {
        base_url: spawn(router).await,
        hits,
    }
}

/// Every request answers 503.
#[allow(dead_code)]
pub async fn spawn_broken_upstream() -> String {
    let router = Router::new().fallback(|| async { StatusCode::SERVICE_UNAVAILABLE });
    spawn(router).await
}

// ---------------------------------------------------------------------------
// Document database
// ---------------------------------------------------------------------------

async fn list_documents(
    State(hits): State<UpstreamHits>,
    Path((project, collection)): Path<(String, String)>,
) -> Json<Value> {
    hits.documents.fetch_add(1, Ordering::SeqCst);
    let name = |id: &str| format!("projects/{project}/databases/(default)/documents/{collection}/{id}");
    Json(json!({
        "documents": [
            {"name": name("a1"), "fields": {
                "title": {"stringValue": "Weekly report"},
                "views": {"integerValue": "12"}
            }},
            {"name": name("b2"), "fields": {
                "title": {"stringValue": "Launch notes"},
                "tags": {"arrayValue": {"values": [{"stringValue": "defi"}]}}
            }}
        ]
    }))
}

/// Serves `GET .../documents/{collection}` for any project.
#[allow(dead_code)]
pub async fn spawn_documents() -> FakeUpstream {
    let hits = UpstreamHits::default();
    let router = Router::new()
        .route(
            "/v1/projects/:project/databases/(default)/documents/:collection",
            get(list_documents),
        )
        .with_state(hits.clone());

    FakeUpstream {
        base_url: spawn(router).await,
        hits,
    }
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

/// Config with every provider pointed at `base_url` and the memory cache.
#[allow(dead_code)]
pub fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        cache_backend: CacheBackendKind::Memory,
        llama_api_url: base_url.to_string(),
        llama_coins_url: base_url.to_string(),
        lido_api_url: base_url.to_string(),
        lido_wq_api_url: base_url.to_string(),
        ..AppConfig::default()
    }
}

#[allow(dead_code)]
pub fn test_state(config: AppConfig) -> AppState {
    let cache = CacheStore::memory(config.cache_ttl_secs);
    AppState::new(config, cache, reqwest::Client::new())
}

/// Config for the data service against a fake document database.
#[allow(dead_code)]
pub fn documents_config(firestore_url: &str) -> AppConfig {
    AppConfig {
        cache_backend: CacheBackendKind::Memory,
        firebase: Some(FirebaseConfig {
            project_id: "dash-test".into(),
            ..Default::default()
        }),
        firestore_url: Some(format!("{firestore_url}/v1")),
        data_collection: "reports".into(),
        ..AppConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[allow(dead_code)]
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read_json(resp).await
}

#[allow(dead_code)]
pub async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    read_json(resp).await
}

/// POST `body` verbatim with a JSON content type.
#[allow(dead_code)]
pub async fn post_raw(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
        .unwrap();
    read_json(resp).await
}

async fn read_json(resp: axum::response::Response) -> (StatusCode, Value) {
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}
