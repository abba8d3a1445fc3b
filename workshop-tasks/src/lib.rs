/*!
# Task Manager service

CRUD over a single `tasks.json` collection, with an optional `completed`
filter on the list route.
*/

pub mod board;
pub mod http;
pub mod models;

pub use board::{SharedBoard, TaskBoard};
pub use http::build_router;

pub const DEFAULT_PORT: u16 = 8000;
