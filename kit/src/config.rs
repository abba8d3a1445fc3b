use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// Runtime settings of one demo service.
///
/// Resolution order: defaults, then `<service>.yaml` (or `WORKSHOP_CONFIG`),
/// then the `WORKSHOP_HOST` / `WORKSHOP_PORT` / `WORKSHOP_DATA_DIR` variables.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub cors: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            data_dir: PathBuf::from("data"),
            cors: true,
        }
    }
}

impl ServiceConfig {
    pub fn with_port(port: u16) -> Self {
        Self { port, ..Self::default() }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Path of a collection file inside the data directory
    pub fn data_file(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Loads `.env`, the YAML file and the env overrides for `service`
    pub async fn load(service: &str, default_port: u16) -> Self {
        dotenvy::dotenv().ok();

        let path = std::env::var("WORKSHOP_CONFIG").unwrap_or_else(|_| format!("{service}.yaml"));
        let mut cfg = read_yaml(Path::new(&path), default_port).await;
        cfg.apply_env(|key| std::env::var(key).ok());

        info!("[{service}] config: {}:{} data={:?}", cfg.host, cfg.port, cfg.data_dir);
        cfg
    }

    /// Applies `WORKSHOP_*` overrides read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("WORKSHOP_HOST").filter(|h| !h.trim().is_empty()) {
            self.host = host;
        }
        if let Some(port) = lookup("WORKSHOP_PORT") {
            match port.trim().parse() {
                Ok(port) => self.port = port,
                Err(_) => warn!("[config] ignoring WORKSHOP_PORT={port:?}, not a port number"),
            }
        }
        if let Some(dir) = lookup("WORKSHOP_DATA_DIR").filter(|d| !d.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
    }
}

async fn read_yaml(path: &Path, default_port: u16) -> ServiceConfig {
    let fallback = ServiceConfig::with_port(default_port);
    if !path.exists() {
        info!("[config] no {path:?}, using defaults");
        return fallback;
    }

    let txt = match fs::read_to_string(path).await {
        Ok(txt) => txt,
        Err(e) => {
            warn!("[config] cannot read {path:?}: {e}");
            return fallback;
        }
    };
    if txt.trim().is_empty() {
        return fallback;
    }

    // keys missing from the file keep the service's own default port
    let mut base = serde_yaml::Value::Mapping(Default::default());
    if let Ok(value) = serde_yaml::to_value(&fallback) {
        base = value;
    }
    match serde_yaml::from_str::<serde_yaml::Value>(&txt) {
        Ok(serde_yaml::Value::Mapping(overrides)) => {
            if let serde_yaml::Value::Mapping(map) = &mut base {
                map.extend(overrides);
            }
            serde_yaml::from_value(base).unwrap_or_else(|e| {
                warn!("[config] invalid {path:?}: {e}");
                fallback
            })
        }
        Ok(_) => {
            warn!("[config] {path:?} is not a mapping, using defaults");
            fallback
        }
        Err(e) => {
            warn!("[config] invalid {path:?}: {e}");
            fallback
        }
    }
}
