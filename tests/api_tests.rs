mod common;

use axum::http::StatusCode;
use axum::Router;
use serde_json::json;

use defi_dashboard::api::create_api_router;
use defi_dashboard::cache::CacheStore;
use defi_dashboard::firestore::FirestoreClient;
use defi_dashboard::AppState;

use common::{
    chains_fixture, get_json, spawn_broken_upstream, spawn_upstream, spawn_upstream_with_chains,
    test_config, test_state, FakeUpstream,
};

async fn build_test_app() -> (Router, FakeUpstream) {
    let upstream = spawn_upstream().await;
    let app = create_api_router(test_state(test_config(&upstream.base_url)));
    (app, upstream)
}

async fn build_broken_app() -> Router {
    let base_url = spawn_broken_upstream().await;
    create_api_router(test_state(test_config(&base_url)))
}

#[tokio::test]
async fn test_health_check() {
    let (app, _upstream) = build_test_app().await;

    let (status, json) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"status": "healthy"}));
}

// ---------------------------------------------------------------------------
// Protocols
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_protocols_sorted_by_tvl() {
    let (app, _upstream) = build_test_app().await;

    let (status, json) = get_json(&app, "/api/protocols").await;
    assert_eq!(status, StatusCode::OK);

    let protocols = json.as_array().unwrap();
    assert_eq!(protocols.len(), 6);
    assert_eq!(protocols[0]["name"], "Lido");
    assert_eq!(protocols[0]["category"], "Liquid Staking");
    assert_eq!(protocols[0]["change_24h"], 1.0);
    assert_eq!(protocols[0]["logo"], "/placeholder-logo.png");
    assert!(protocols[0]["mcapTvlRatio"].as_f64().unwrap() > 0.0);
    assert_eq!(protocols[1]["chainTvls"]["Polygon"], 2.0e9);
}

#[tokio::test]
async fn test_protocols_query_sort_and_limit() {
    let (app, _upstream) = build_test_app().await;

    let (status, json) = get_json(&app, "/api/protocols?sortBy=tvl&order=asc&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Dust Staking", "Raydium"]);

    let (_, json) = get_json(&app, "/api/protocols?search=aave").await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (_, json) = get_json(&app, "/api/protocols?category=liquid%20staking&chain=solana").await;
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Jito"]);
}

#[tokio::test]
async fn test_protocols_rejects_unknown_sort_field() {
    let (app, _upstream) = build_test_app().await;

    let (status, json) = get_json(&app, "/api/protocols?sortBy=password").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("password"));

    let (status, _) = get_json(&app, "/api/protocols?sortBy=tvl&order=sideways").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = get_json(&app, "/api/protocols?limit=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_protocols_served_from_cache() {
    let (app, upstream) = build_test_app().await;

    let (first, _) = get_json(&app, "/api/protocols").await;
    let (second, json) = get_json(&app, "/api/protocols?limit=1").await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(upstream.hits.protocols(), 1);
}

#[tokio::test]
async fn test_protocols_served_when_cache_store_is_down() {
    let upstream = spawn_upstream().await;
    let store_url = spawn_broken_upstream().await;
    let documents = FirestoreClient::new(
        reqwest::Client::new(),
        format!("{store_url}/v1/projects/dash-test/databases/(default)/documents"),
        None,
    );
    let cache = CacheStore::documents(documents, 300);
    let state = AppState::new(test_config(&upstream.base_url), cache, reqwest::Client::new());
    let app = create_api_router(state);

    for _ in 0..2 {
        let (status, json) = get_json(&app, "/api/protocols").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 6);
        assert_eq!(json[0]["name"], "Lido");
    }

    // Nothing could be cached, so both requests reached the provider.
    assert_eq!(upstream.hits.protocols(), 2);
}

// ---------------------------------------------------------------------------
// Chains
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_chains_merged_with_market_caps() {
    let (app, _upstream) = build_test_app().await;

    let (status, json) = get_json(&app, "/api/chains").await;
    assert_eq!(status, StatusCode::OK);

    let chains = json.as_array().unwrap();
    let names: Vec<&str> = chains.iter().map(|c| c["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Ethereum", "Solana", "Polygon"]);

    let eth = &chains[0];
    assert_eq!(eth["id"], "ethereum");
    assert_eq!(eth["tokenSymbol"], "ETH");
    assert_eq!(eth["marketCap"], 400.0e9);
    assert_eq!(eth["protocols"], 1200);
    assert!((eth["mcapToTvl"].as_f64().unwrap() - 400.0 / 60.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_chains_filter_by_name() {
    let (app, upstream) = build_test_app().await;

    let (status, json) = get_json(&app, "/api/chains?chain=solana").await;
    assert_eq!(status, StatusCode::OK);
    let chains = json.as_array().unwrap();
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0]["name"], "Solana");

    get_json(&app, "/api/chains").await;
    assert_eq!(upstream.hits.chains(), 1);
}

#[tokio::test]
async fn test_chain_detail_lists_protocols() {
    let (app, _upstream) = build_test_app().await;

    let (status, json) = get_json(&app, "/api/chains/solana").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Solana");
    assert_eq!(json["marketCap"], 80.0e9);

    let protocols = json["protocols"].as_array().unwrap();
    let names: Vec<&str> = protocols.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Jito", "Raydium"]);
    assert_eq!(protocols[0]["tvl"], 2.0e9);
}

#[tokio::test]
async fn test_chain_detail_not_found() {
    let (app, _upstream) = build_test_app().await;

    let (status, json) = get_json(&app, "/api/chains/cardano").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({"error": "Cardano data not found"}));
}

#[tokio::test]
async fn test_chain_detail_missing_from_provider() {
    let mut chains = chains_fixture();
    chains
        .as_array_mut()
        .unwrap()
        .retain(|c| c["name"] != "Solana");
    let upstream = spawn_upstream_with_chains(chains).await;
    let app = create_api_router(test_state(test_config(&upstream.base_url)));

    let (status, json) = get_json(&app, "/api/chains/solana").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({"error": "Solana data not found"}));
    assert_eq!(upstream.hits.protocols(), 0);
}

#[tokio::test]
async fn test_chains_upstream_failure() {
    let app = build_broken_app().await;

    let (status, json) = get_json(&app, "/api/chains").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({"error": "Failed to fetch chain data"}));

    let (status, json) = get_json(&app, "/api/chains/solana").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({"error": "Failed to fetch Solana data"}));
}

// ---------------------------------------------------------------------------
// Chain overview
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_aggregated_chain() {
    let (app, _upstream) = build_test_app().await;

    let (status, json) = get_json(&app, "/api/aggregated/ethereum").await;
    assert_eq!(status, StatusCode::OK);

    // Aave is multi-chain and Dust Staking has no TVL.
    assert_eq!(json["totalProtocols"], 2);
    assert_eq!(json["totalTvl"], 33.0e9);
    assert_eq!(json["tokenPrice"], 3000.0);
    assert_eq!(json["averageChange1d"], 0.75);
    assert_eq!(json["priceChange24h"], 0.75);
    assert_eq!(json["protocols"][0]["name"], "Lido");
    assert_eq!(json["protocols"][1]["name"], "Rocket Pool");
}

#[tokio::test]
async fn test_aggregated_rejects_unknown_chain() {
    let (app, _upstream) = build_test_app().await;

    let (status, json) = get_json(&app, "/api/aggregated/cardano").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({"error": "Unsupported chain: cardano"}));
}

#[tokio::test]
async fn test_historical_window() {
    let (app, _upstream) = build_test_app().await;

    let (status, json) = get_json(&app, "/api/historical/ethereum?days=30").await;
    assert_eq!(status, StatusCode::OK);

    let tvl = json["tvl"].as_array().unwrap();
    assert_eq!(tvl.len(), 2);
    assert_eq!(tvl[0]["tvl"], 90.0e9);
    assert_eq!(tvl[0]["marketCap"], 135.0e9);
    assert_eq!(tvl[0]["ratio"], 1.5);
    assert_eq!(tvl[1]["tvl"], 100.0e9);
    assert_eq!(json["marketCap"], json["tvl"]);
    assert_eq!(json["ratio"], json["tvl"]);

    let (_, json) = get_json(&app, "/api/historical/eth?days=365").await;
    assert_eq!(json["tvl"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_historical_rejects_bad_input() {
    let (app, _upstream) = build_test_app().await;

    let (status, _) = get_json(&app, "/api/historical/cardano").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(&app, "/api/historical/ethereum?days=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = get_json(&app, "/api/historical/ethereum?days=-5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]
        .as_str()
        .is_some_and(|msg| msg.contains("query string")));
}

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_fees_table() {
    let (app, _upstream) = build_test_app().await;

    let (status, json) = get_json(&app, "/api/fees").await;
    assert_eq!(status, StatusCode::OK);

    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 3);

    let uniswap = &rows[0];
    assert_eq!(uniswap["name"], "Uniswap");
    assert_eq!(uniswap["id"], "uniswap");
    assert_eq!(uniswap["category"], "DEX");
    assert_eq!(uniswap["fees"]["daily"], 400.0);
    assert_eq!(uniswap["revenue"]["daily"], 400.0 * 0.3);
    assert_eq!(uniswap["revenue"]["weekly"], 2800.0 * 0.3);

    assert_eq!(rows[2]["id"], "aave-v3");
    assert_eq!(rows[2]["fees"]["weekly"], 0.0);

    let (_, json) = get_json(&app, "/api/fees?sortBy=name&order=asc").await;
    assert_eq!(json[0]["name"], "Aave V3");
}

#[tokio::test]
async fn test_fee_history() {
    let (app, _upstream) = build_test_app().await;

    let (status, json) = get_json(&app, "/api/fees/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!([
            {"timestamp": 1714521600, "date": "2024-05-01", "fees": 100.0, "revenue": 50.0},
            {"timestamp": 1714608000, "date": "2024-05-02", "fees": 200.0, "revenue": 100.0}
        ])
    );
}

// ---------------------------------------------------------------------------
// Liquid staking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_liquid_staking_platforms() {
    let (app, _upstream) = build_test_app().await;

    let (status, json) = get_json(&app, "/api/liquid-staking").await;
    assert_eq!(status, StatusCode::OK);

    let platforms = json.as_array().unwrap();
    let names: Vec<&str> = platforms.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Lido", "Rocket Pool", "Jito"]);

    let lido = &platforms[0];
    assert_eq!(lido["liquidityDepth"], 5000.0);
    assert_eq!(lido["withdrawalTime"], 48.0);
    assert!((lido["stakingRatio"].as_f64().unwrap() - 0.32).abs() < 1e-9);

    let rocket = &platforms[1];
    assert_eq!(rocket["stakingRatio"], 0.6);
    assert_eq!(rocket["liquidityDepth"], 3.0e9 * 0.4);

    for p in platforms {
        let score = p["healthScore"].as_u64().unwrap();
        assert!((5..=100).contains(&score), "score {score} out of range");
        let color = p["healthColor"].as_str().unwrap();
        assert!(["black", "red", "yellow", "green"].contains(&color));
    }

    // Scores are frozen while the entry is cached.
    let (_, again) = get_json(&app, "/api/liquid-staking").await;
    assert_eq!(again, json);
}
