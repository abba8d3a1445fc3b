/*!
# Starter template

The smallest service of the workshop: config, logging and a `db.json`
collection are wired up, and the router only answers `/` and `/health`.
New routes go in [`build_router`].
*/

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::sync::Arc;
use workshop_kit::{JsonCollection, Record, StoreError};

pub const DB_FILE: &str = "db.json";
pub const DEFAULT_PORT: u16 = 8003;

/// Free-form record: an id plus whatever fields the workshop adds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record for Entry {
    fn id(&self) -> u64 {
        self.id
    }
}

pub type SharedDb = Arc<JsonCollection<Entry>>;

pub fn open_db(data_dir: &Path) -> Result<SharedDb, StoreError> {
    Ok(Arc::new(JsonCollection::open(data_dir.join(DB_FILE))?))
}

pub fn build_router(db: SharedDb) -> Router {
    Router::new().route("/", get(root)).with_state(db)
}

async fn root(State(db): State<SharedDb>) -> Json<Value> {
    Json(json!({
        "Hello": "World",
        "message": "Workshop starter",
        "version": env!("CARGO_PKG_VERSION"),
        "records": db.len(),
        "endpoints": {
            "health": "/health"
        }
    }))
}
