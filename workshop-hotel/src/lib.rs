/*!
# Hotel Booking service

Rooms, bookings with an availability check on half-open date ranges,
booking status lifecycle and hotel statistics, persisted as two JSON files
(`rooms.json`, `bookings.json`) in the data directory.
*/

pub mod availability;
pub mod filters;
pub mod http;
pub mod models;
pub mod state;
pub mod stats;

pub use http::{build_router, HotelApp};
pub use state::{HotelState, SharedHotel};

/// Port used when neither the config file nor `WORKSHOP_PORT` sets one
pub const DEFAULT_PORT: u16 = 8002;
