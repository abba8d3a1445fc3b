/*!
# Workshop Kit - shared plumbing for the workshop REST demos

Everything the demo services have in common lives here so that each service
crate only contains its routes and domain rules:
- JSON-file collections with one lock per collection (`store`)
- the API error type and its HTTP mapping (`error`)
- extractors that turn rejections into API errors (`extract`)
- filtering / sorting / pagination helpers for list endpoints (`listing`)
- service configuration (`config`), logging (`telemetry`) and bootstrap (`server`)
- an in-process HTTP client for tests (`testing`, behind the `testing` feature)
*/

pub mod config;
pub mod error;
pub mod extract;
pub mod listing;
pub mod server;
pub mod store;
pub mod telemetry;

#[cfg(feature = "testing")]
pub mod testing;

pub use config::ServiceConfig;
pub use error::{ApiError, ApiResult};
pub use extract::{Id, JsonBody, Normalize, QueryParams, Valid};
pub use listing::{Page, PageParams, SortOrder};
pub use store::{Draft, JsonCollection, Record, StoreError};
