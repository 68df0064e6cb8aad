mod config;
mod flows;
mod gateway;
mod handlers;
mod prompts;
mod routes;
mod state;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("natiq_backend=debug,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match Config::discover() {
        Some((config, path)) => {
            info!("Loaded configuration from: {}", path);
            config
        }
        None => {
            warn!(
                "No config file found (tried {:?}), using defaults",
                Config::search_paths()
            );
            Config::default()
        }
    };

    let app_state = AppState::new(config.clone())?;
    info!(
        "Model gateway: {}, max words per request: {}",
        app_state.flows.gateway.name(),
        app_state.flows.limits.max_words
    );

    let app = routes::build_app(app_state);

    let addr = format!("{}:{}", config.system_config.host, config.system_config.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
