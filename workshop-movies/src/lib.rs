/*!
# Movie Review service

Movies and their reviews, with ratings derived from the reviews on every
read, list filtering and catalog statistics. Persisted as `movies.json`
and `reviews.json` in the data directory.
*/

pub mod filters;
pub mod http;
pub mod models;
pub mod rating;
pub mod state;
pub mod stats;

pub use http::{build_router, CatalogApp};
pub use state::{CatalogState, SharedCatalog};

/// Port used when neither the config file nor `WORKSHOP_PORT` sets one
pub const DEFAULT_PORT: u16 = 8001;
