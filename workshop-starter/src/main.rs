use tracing::info;
use workshop_kit::{server, telemetry, ServiceConfig};
use workshop_starter::{build_router, open_db, DEFAULT_PORT};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let cfg = ServiceConfig::load("starter", DEFAULT_PORT).await;
    let db = open_db(&cfg.data_dir)?;
    info!("[starter] {} records in {}", db.len(), db.path().display());

    server::serve(build_router(db.clone()), &cfg).await?;

    db.flush()?;
    Ok(())
}
