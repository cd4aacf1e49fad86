//! carbon-charge server entry point.
//!
//! Loads configuration, opens the fuel-mix source, and starts the Axum
//! HTTP server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use carbon_charge::api;
use carbon_charge::app_state::AppState;
use carbon_charge::config::{AppConfig, DataSource, LogFormat};
use carbon_charge::domain::EmissionsFactorTable;
use carbon_charge::ingestion::{CsvFuelMixProvider, FuelMixProvider, PostgresFuelMixProvider};
use carbon_charge::service::RecommendationService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("loading configuration")?;

    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting carbon-charge");

    let provider = open_provider(&config).await?;
    tracing::info!(source = provider.kind(), "fuel-mix source ready");

    let service = RecommendationService::new(provider, Arc::new(EmissionsFactorTable::default()));
    let app_state = AppState::new(service);

    let app = api::build_router()
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await.context("serving HTTP")?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

async fn open_provider(config: &AppConfig) -> anyhow::Result<Arc<dyn FuelMixProvider>> {
    match &config.data_source {
        DataSource::Csv { data_dir } => {
            tracing::info!(data_dir = %data_dir.display(), "using CSV fuel-mix files");
            Ok(Arc::new(CsvFuelMixProvider::new(data_dir.clone())))
        }
        DataSource::Postgres => {
            let provider = PostgresFuelMixProvider::connect(&config.database)
                .await
                .context("connecting to PostgreSQL")?;
            if config.database.ensure_schema {
                provider
                    .ensure_schema()
                    .await
                    .context("creating fuel_mix schema")?;
                tracing::info!("fuel_mix schema ready");
            }
            Ok(Arc::new(provider))
        }
    }
}
