/**
 * WORKSHOP MOVIES - entry point of the movie review demo
 */

use std::sync::Arc;
use tracing::info;
use workshop_kit::{server, telemetry, ServiceConfig};
use workshop_movies::{build_router, CatalogApp, CatalogState, DEFAULT_PORT};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let cfg = ServiceConfig::load("movies", DEFAULT_PORT).await;
    let catalog = Arc::new(CatalogState::open(&cfg.data_dir)?);
    info!(
        "[movies] {} movies, {} reviews loaded",
        catalog.movies().len(),
        catalog.reviews().len()
    );

    server::serve(build_router(CatalogApp::new(catalog.clone())), &cfg).await?;

    catalog.flush()?;
    info!("[movies] data flushed");
    Ok(())
}
