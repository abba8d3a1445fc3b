use tracing_subscriber::{fmt, EnvFilter};

/// Installs the `fmt` subscriber. `RUST_LOG` wins, otherwise `info`.
/// Safe to call twice (tests build several apps in one process).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).try_init().ok();
}
