/**
 * WORKSHOP HOTEL - entry point of the hotel booking demo
 *
 * Loads the config, opens rooms.json / bookings.json, serves the API and
 * flushes both collections on shutdown.
 */

use std::sync::Arc;
use tracing::info;
use workshop_hotel::{build_router, HotelApp, HotelState, DEFAULT_PORT};
use workshop_kit::{server, telemetry, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let cfg = ServiceConfig::load("hotel", DEFAULT_PORT).await;
    let hotel = Arc::new(HotelState::open(&cfg.data_dir)?);
    info!(
        "[hotel] {} rooms, {} bookings loaded",
        hotel.rooms().len(),
        hotel.bookings().len()
    );

    server::serve(build_router(HotelApp::new(hotel.clone())), &cfg).await?;

    hotel.flush()?;
    info!("[hotel] data flushed, bye");
    Ok(())
}
