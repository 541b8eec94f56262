use std::sync::Arc;

use anyhow::anyhow;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rootie_api::{build_router, AppState, Config};
use rootie_llm::ClientFactory;
use rootie_persist::PersistClientBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Rootie API server");
    tracing::info!(
        endpoint_id = %config.llm.endpoint_id,
        model_name = %config.llm.model_name,
        encrypted = config.llm.encrypted,
        "Initializing LLM client"
    );
    let llm_client = ClientFactory::create_client(&config.provider_config())?;

    tracing::info!(
        backend = config.storage.backend.as_str(),
        path = %config.storage.path,
        "Opening storage"
    );
    let persist = PersistClientBuilder::new()
        .backend(config.storage.backend)
        .path(&config.storage.path)
        .build()?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, llm_client, persist));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/api/health", addr);
    tracing::info!("API docs: http://{}/api/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
