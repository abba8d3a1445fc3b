/**
 * AVAILABILITY - which rooms are free for a stay
 *
 * Stays are half-open `[check_in, check_out)`: the check-out day is free
 * for the next guest. A room is taken for a night when one of its bookings
 * in a room-holding status (pending, confirmed, checked-in) covers it.
 * Plain linear scans, the collections are small.
 */

use serde::Serialize;
use time::Date;
use workshop_kit::listing::round_to;
use workshop_kit::ApiError;

use crate::models::{Booking, Room, RoomType};

/// A validated `[check_in, check_out)` range, at least one night long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayRange {
    pub check_in: Date,
    pub check_out: Date,
}

impl StayRange {
    pub fn new(check_in: Date, check_out: Date) -> Result<Self, ApiError> {
        if check_out <= check_in {
            return Err(ApiError::validation(
                "check_out_date",
                "Check-out date must be after check-in date",
            ));
        }
        Ok(Self { check_in, check_out })
    }

    pub fn of(booking: &Booking) -> Self {
        Self {
            check_in: booking.check_in_date,
            check_out: booking.check_out_date,
        }
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).whole_days()
    }

    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    /// Nights of `self` that fall inside `window`
    pub fn nights_within(&self, window: &StayRange) -> i64 {
        let start = self.check_in.max(window.check_in);
        let end = self.check_out.min(window.check_out);
        if end > start {
            (end - start).whole_days()
        } else {
            0
        }
    }
}

/// True when no non-cancelled booking of `room_id` overlaps `stay`.
/// `exclude` skips one booking, the one being edited.
pub fn is_room_free(bookings: &[Booking], room_id: u64, stay: &StayRange, exclude: Option<u64>) -> bool {
    !bookings.iter().any(|b| {
        b.room_id == room_id
            && Some(b.id) != exclude
            && b.status.holds_room()
            && StayRange::of(b).overlaps(stay)
    })
}

#[derive(Debug, Clone, Default)]
pub struct AvailabilityQuery {
    pub num_guests: Option<u32>,
    pub room_type: Option<RoomType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailableRoom {
    #[serde(flatten)]
    pub room: Room,
    pub nights: i64,
    pub total_price_for_stay: f64,
}

/// Rooms open for booking that match the filters and are free for `stay`
pub fn find_available(
    rooms: &[Room],
    bookings: &[Booking],
    stay: &StayRange,
    query: &AvailabilityQuery,
) -> Vec<AvailableRoom> {
    let nights = stay.nights();
    rooms
        .iter()
        .filter(|room| room.is_available)
        .filter(|room| query.room_type.map_or(true, |t| room.room_type == t))
        .filter(|room| query.num_guests.map_or(true, |n| room.capacity >= n))
        .filter(|room| is_room_free(bookings, room.id, stay, None))
        .map(|room| AvailableRoom {
            room: room.clone(),
            nights,
            total_price_for_stay: stay_price(room, stay),
        })
        .collect()
}

/// Price of `stay` in `room`, rounded to cents
pub fn stay_price(room: &Room, stay: &StayRange) -> f64 {
    round_to(room.price_per_night * stay.nights() as f64, 2)
}
