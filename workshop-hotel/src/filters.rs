//! Query strings of the list endpoints and how they filter / sort.

use serde::Deserialize;
use time::Date;
use workshop_kit::listing::contains_ignore_case;
use workshop_kit::{ApiResult, Page, PageParams, SortOrder};

use crate::models::{Booking, BookingStatus, Room, RoomType};

/// `GET /rooms`
#[derive(Debug, Default, Deserialize)]
pub struct RoomListQuery {
    pub room_type: Option<RoomType>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_capacity: Option<u32>,
    pub max_capacity: Option<u32>,
    #[serde(default)]
    pub available_only: bool,
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl RoomListQuery {
    pub fn apply(&self, rooms: Vec<Room>) -> ApiResult<Page<Room>> {
        let page = PageParams::new(self.offset, self.limit)?;

        let mut rooms: Vec<Room> = rooms
            .into_iter()
            .filter(|r| self.room_type.map_or(true, |t| r.room_type == t))
            .filter(|r| self.min_price.map_or(true, |p| r.price_per_night >= p))
            .filter(|r| self.max_price.map_or(true, |p| r.price_per_night <= p))
            .filter(|r| self.min_capacity.map_or(true, |c| r.capacity >= c))
            .filter(|r| self.max_capacity.map_or(true, |c| r.capacity <= c))
            .filter(|r| !self.available_only || r.is_available)
            .collect();

        let order = self.order.unwrap_or(SortOrder::Asc);
        match self.sort_by.as_deref().unwrap_or("id") {
            "id" => order.sort(&mut rooms, |a, b| a.id.cmp(&b.id)),
            "room_number" => order.sort(&mut rooms, |a, b| a.room_number.cmp(&b.room_number)),
            "price_per_night" => order.sort(&mut rooms, |a, b| a.price_per_night.total_cmp(&b.price_per_night)),
            "capacity" => order.sort(&mut rooms, |a, b| a.capacity.cmp(&b.capacity)),
            _ => {}
        }

        Ok(page.apply(rooms))
    }
}

/// `GET /bookings`
#[derive(Debug, Default, Deserialize)]
pub struct BookingListQuery {
    pub room_id: Option<u64>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    #[serde(alias = "status_filter")]
    pub status: Option<BookingStatus>,
    pub check_in_date: Option<Date>,
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl BookingListQuery {
    pub fn apply(&self, bookings: Vec<Booking>) -> ApiResult<Page<Booking>> {
        let page = PageParams::new(self.offset, self.limit)?;

        let mut bookings: Vec<Booking> = bookings
            .into_iter()
            .filter(|b| self.room_id.map_or(true, |id| b.room_id == id))
            .filter(|b| {
                self.guest_name
                    .as_deref()
                    .map_or(true, |name| contains_ignore_case(&b.guest_name, name))
            })
            .filter(|b| {
                self.guest_email
                    .as_deref()
                    .map_or(true, |email| contains_ignore_case(&b.guest_email, email))
            })
            .filter(|b| self.status.map_or(true, |s| b.status == s))
            .filter(|b| self.check_in_date.map_or(true, |d| b.check_in_date == d))
            .collect();

        let order = self.order.unwrap_or(SortOrder::Desc);
        sort_bookings(&mut bookings, self.sort_by.as_deref().unwrap_or("created_at"), order);

        Ok(page.apply(bookings))
    }
}

/// `GET /rooms/{id}/bookings`
#[derive(Debug, Default, Deserialize)]
pub struct RoomBookingsQuery {
    #[serde(alias = "status_filter")]
    pub status: Option<BookingStatus>,
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
}

impl RoomBookingsQuery {
    pub fn apply(&self, room_id: u64, bookings: Vec<Booking>) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = bookings
            .into_iter()
            .filter(|b| b.room_id == room_id)
            .filter(|b| self.status.map_or(true, |s| b.status == s))
            .collect();

        // only the two date keys make sense for a single room
        let sort_by = match self.sort_by.as_deref().unwrap_or("check_in_date") {
            key @ ("check_in_date" | "created_at") => key,
            _ => return bookings,
        };
        sort_bookings(&mut bookings, sort_by, self.order.unwrap_or(SortOrder::Asc));
        bookings
    }
}

fn sort_bookings(bookings: &mut [Booking], sort_by: &str, order: SortOrder) {
    match sort_by {
        "id" => order.sort(bookings, |a, b| a.id.cmp(&b.id)),
        "room_id" => order.sort(bookings, |a, b| a.room_id.cmp(&b.room_id)),
        "check_in_date" => order.sort(bookings, |a, b| a.check_in_date.cmp(&b.check_in_date)),
        "total_price" => order.sort(bookings, |a, b| a.total_price.total_cmp(&b.total_price)),
        "created_at" => order.sort(bookings, |a, b| a.created_at.cmp(&b.created_at)),
        _ => {}
    }
}

/// `GET /rooms/availability`
#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub check_in_date: Date,
    pub check_out_date: Date,
    pub num_guests: Option<u32>,
    pub room_type: Option<RoomType>,
}

/// `GET /stats`, occupancy window
#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    pub from: Option<Date>,
    pub to: Option<Date>,
}

/// `PUT /bookings/{id}/status`
#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub new_status: BookingStatus,
}
