/**
 * SERVER BOOTSTRAP - common tail of every service binary
 *
 * ROLE:
 * Wraps a service router with request tracing and CORS, binds the configured
 * address and serves until Ctrl-C / SIGTERM. The caller flushes its stores
 * once `serve` returns.
 */

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServiceConfig;

/// Adds `GET /health` plus the tracing / CORS layers
pub fn with_layers(router: Router, cfg: &ServiceConfig) -> Router {
    let router = router
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http());
    if cfg.cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

async fn health() -> &'static str {
    "ok"
}

pub async fn serve(router: Router, cfg: &ServiceConfig) -> anyhow::Result<()> {
    let app = with_layers(router, cfg);
    let listener = TcpListener::bind(cfg.addr()).await?;
    info!("[server] listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("[server] stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("[server] cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
        info!("[server] Ctrl-C received, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("[server] SIGTERM received, shutting down");
            }
            Err(e) => {
                tracing::error!("[server] cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
