use defi_dashboard::api::create_analytics_router;
use defi_dashboard::cache::CacheStore;
use defi_dashboard::config::AppConfig;
use defi_dashboard::metrics::init_metrics;
use defi_dashboard::server::{init_tracing, serve};
use defi_dashboard::{http_client, AppState};

const DEFAULT_PORT: u16 = 3003;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env(DEFAULT_PORT)?;
    init_tracing(config.log_json);

    let metrics_handle = init_metrics();
    let http = http_client()?;
    let cache = CacheStore::connect(&config, http.clone()).await?;
    tracing::info!(
        backend = cache.backend_name(),
        events_key = %config.analytics_events_key,
        "analytics service starting"
    );

    let addr = config.bind_addr();
    let state = AppState::new(config, cache, http).with_metrics(metrics_handle);
    serve(create_analytics_router(state), &addr, "analytics").await
}
