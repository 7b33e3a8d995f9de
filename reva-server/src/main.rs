//! reva-server - review ingestion and aggregation service
//!
//! Ingests customer-review CSVs, labels them through the external
//! classification service, persists the labeled batches as groups, and
//! serves aggregate analytics over the stored reviews.

use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};

use reva_common::config::Config;
use reva_common::db::init_database;
use reva_server::services::ClassifierClient;
use reva_server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting REVA server v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    info!("Classifier endpoint: {}", config.classifier_base_url);
    info!("Database path: {}", config.database_path.display());

    let pool = match init_database(&config.database_path).await {
        Ok(pool) => {
            info!("✓ Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let classifier = ClassifierClient::new(
        &config.classifier_base_url,
        Duration::from_secs(config.classifier_timeout_secs),
    )?;

    let state = AppState::new(pool, classifier).with_upload_limit(config.max_upload_bytes);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("reva-server listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
