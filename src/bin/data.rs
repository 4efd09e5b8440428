use defi_dashboard::api::create_data_router;
use defi_dashboard::cache::CacheStore;
use defi_dashboard::config::AppConfig;
use defi_dashboard::server::{init_tracing, serve};
use defi_dashboard::{http_client, AppState};

const DEFAULT_PORT: u16 = 3002;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env(DEFAULT_PORT)?;
    init_tracing(config.log_json);

    let http = http_client()?;
    let cache = CacheStore::connect(&config, http.clone()).await?;

    let addr = config.bind_addr();
    let state = AppState::new(config, cache, http);
    match &state.config.firebase {
        Some(firebase) => tracing::info!(
            project = %firebase.project_id,
            collection = %state.config.data_collection,
            "data service starting"
        ),
        None => tracing::warn!("no Firebase project configured, /api/data will fail"),
    }

    serve(create_data_router(state), &addr, "data").await
}
