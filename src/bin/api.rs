use defi_dashboard::api::create_api_router;
use defi_dashboard::cache::CacheStore;
use defi_dashboard::config::AppConfig;
use defi_dashboard::server::{init_tracing, serve};
use defi_dashboard::{http_client, AppState};

const DEFAULT_PORT: u16 = 3001;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env(DEFAULT_PORT)?;
    init_tracing(config.log_json);

    let http = http_client()?;
    let cache = CacheStore::connect(&config, http.clone()).await?;
    tracing::info!(
        backend = cache.backend_name(),
        ttl_secs = cache.ttl().num_seconds(),
        llama = %config.llama_api_url,
        "API gateway starting"
    );

    let addr = config.bind_addr();
    let state = AppState::new(config, cache, http);
    serve(create_api_router(state), &addr, "api").await
}
