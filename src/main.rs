//! pokesync - Pokemon ranking synchronization pipeline
//!
//! Pulls the ranking snapshot from the analytical warehouse, enriches each
//! entry from PokeAPI at a bounded request rate, and persists raw,
//! enrichment, and merged datasets into the local store.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pokesync::config::PipelineConfig;
use pokesync::services::enricher::Enricher;
use pokesync::services::notifier;
use pokesync::services::pipeline::Pipeline;
use pokesync::services::pokeapi_client::PokeApiClient;
use pokesync::services::warehouse_client::WarehouseClient;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting pokesync");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = PipelineConfig::load()?;
    info!(mode = ?config.run_mode, "Configuration resolved");
    info!("Database: {}", config.database_path.display());

    let db_pool = pokesync::db::init_database_pool(&config.database_path).await?;
    info!("Database connection established");

    let source = Arc::new(WarehouseClient::new(&config.warehouse)?);
    let lookup = Arc::new(PokeApiClient::new(&config.pokeapi.base_url)?);
    let enricher = Enricher::new(lookup, config.pokeapi.request_interval);
    let notifier = notifier::from_config(&config)?;

    let pipeline = Pipeline::new(db_pool, source, enricher, notifier);
    let summary = pipeline.run().await?;

    info!(
        reference_rows = summary.reference_rows,
        new_records = summary.new_records,
        failures = summary.failures,
        "pokesync finished"
    );

    Ok(())
}
