//! # ironframe-api — Binary Entry Point
//!
//! Starts the Axum HTTP server and the recurring cadence job.
//! Binds to configurable port (default 8080).

use ironframe_api::state::{AppConfig, AppState};
use ironframe_cadence::CadenceConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    let cadence = match &config.cadence_config_path {
        Some(path) => {
            let cadence = CadenceConfig::load(path).map_err(|e| {
                tracing::error!("Cadence configuration failed to load: {e}");
                e
            })?;
            tracing::info!(
                path = %path.display(),
                stakeholders = cadence.company_stakeholders.len(),
                "cadence configuration loaded"
            );
            cadence
        }
        None => {
            tracing::warn!(
                "CADENCE_CONFIG not set — using defaults with no escalation stakeholders. \
                 30-day escalations will be skipped."
            );
            CadenceConfig::default()
        }
    };

    // Initialize database pool (optional — absent means in-memory only).
    let db_pool = ironframe_api::db::init_pool().await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let port = config.port;
    let state = AppState::with_config(config, cadence, db_pool);

    state.hydrate_from_db().await.map_err(|e| {
        tracing::error!("Database hydration failed: {e}");
        e
    })?;

    ironframe_api::scheduler::spawn_cadence_job(state.clone());

    let app = ironframe_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Ironframe API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
