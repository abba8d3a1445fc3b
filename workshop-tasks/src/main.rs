use std::sync::Arc;
use tracing::info;
use workshop_kit::{server, telemetry, ServiceConfig};
use workshop_tasks::{build_router, TaskBoard, DEFAULT_PORT};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let cfg = ServiceConfig::load("tasks", DEFAULT_PORT).await;
    let board = Arc::new(TaskBoard::open(&cfg.data_dir)?);
    info!("[tasks] {} tasks loaded", board.len());

    server::serve(build_router(board.clone()), &cfg).await?;

    board.flush()?;
    Ok(())
}
