use serde::Serialize;
use std::collections::BTreeMap;
use time::Date;
use workshop_kit::listing::round_to;

use crate::availability::StayRange;
use crate::models::{Booking, BookingStatus, Room};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Occupancy {
    pub from: Date,
    pub to: Date,
    pub booked_room_nights: i64,
    pub total_room_nights: i64,
    pub occupancy_rate: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HotelStats {
    pub total_rooms: usize,
    pub available_rooms: usize,
    pub total_bookings: usize,
    pub total_revenue: f64,
    pub average_price_per_night: Option<f64>,
    pub room_type_distribution: BTreeMap<&'static str, usize>,
    pub booking_status_distribution: BTreeMap<&'static str, usize>,
    pub occupancy: Occupancy,
}

/// Aggregates over the current rooms and bookings, occupancy measured on `window`
pub fn compute(rooms: &[Room], bookings: &[Booking], window: &StayRange) -> HotelStats {
    let mut room_type_distribution = BTreeMap::new();
    for room in rooms {
        *room_type_distribution.entry(room.room_type.as_str()).or_insert(0) += 1;
    }

    let mut booking_status_distribution = BTreeMap::new();
    for booking in bookings {
        *booking_status_distribution.entry(booking.status.as_str()).or_insert(0) += 1;
    }

    let revenue: f64 = bookings
        .iter()
        .filter(|b| b.status.earns_revenue())
        .map(|b| b.total_price)
        .sum();

    let average_price_per_night = (!rooms.is_empty()).then(|| {
        let sum: f64 = rooms.iter().map(|r| r.price_per_night).sum();
        round_to(sum / rooms.len() as f64, 2)
    });

    HotelStats {
        total_rooms: rooms.len(),
        available_rooms: rooms.iter().filter(|r| r.is_available).count(),
        total_bookings: bookings.len(),
        total_revenue: round_to(revenue, 2),
        average_price_per_night,
        room_type_distribution,
        booking_status_distribution,
        occupancy: occupancy(rooms, bookings, window),
    }
}

/// Booked room-nights over available room-nights inside `window`.
/// Cancelled bookings and bookings of deleted rooms do not count.
pub fn occupancy(rooms: &[Room], bookings: &[Booking], window: &StayRange) -> Occupancy {
    let booked_room_nights: i64 = bookings
        .iter()
        .filter(|b| b.status != BookingStatus::Cancelled)
        .filter(|b| rooms.iter().any(|r| r.id == b.room_id))
        .map(|b| StayRange::of(b).nights_within(window))
        .sum();
    let total_room_nights = rooms.len() as i64 * window.nights();

    let occupancy_rate = if total_room_nights == 0 {
        0.0
    } else {
        round_to(booked_room_nights as f64 / total_room_nights as f64, 4)
    };

    Occupancy {
        from: window.check_in,
        to: window.check_out,
        booked_room_nights,
        total_room_nights,
        occupancy_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoomType;
    use time::macros::{date, datetime};

    fn room(id: u64, room_type: RoomType, price: f64) -> Room {
        Room {
            id,
            room_number: id.to_string(),
            room_type,
            price_per_night: price,
            capacity: 2,
            amenities: vec![],
            is_available: id != 3,
            description: "Room used in stats tests".into(),
        }
    }

    fn booking(id: u64, room_id: u64, from: Date, to: Date, price: f64, status: BookingStatus) -> Booking {
        Booking {
            id,
            room_id,
            guest_name: "Guest".into(),
            guest_email: "guest@example.com".into(),
            check_in_date: from,
            check_out_date: to,
            num_guests: 1,
            total_price: price,
            status,
            created_at: datetime!(2025-01-01 0:00 UTC),
            special_requests: None,
        }
    }

    #[test]
    fn test_empty_hotel() {
        let window = StayRange::new(date!(2025 - 02 - 01), date!(2025 - 03 - 01)).unwrap();
        let stats = compute(&[], &[], &window);

        assert_eq!(stats.total_rooms, 0);
        assert_eq!(stats.total_revenue, 0.0);
        assert_eq!(stats.average_price_per_night, None);
        assert_eq!(stats.occupancy.occupancy_rate, 0.0);
    }

    #[test]
    fn test_revenue_and_distributions() {
        let rooms = vec![
            room(1, RoomType::Double, 100.0),
            room(2, RoomType::Double, 150.0),
            room(3, RoomType::Suite, 350.0),
        ];
        let d1 = date!(2025 - 02 - 01);
        let d2 = date!(2025 - 02 - 03);
        let bookings = vec![
            booking(1, 1, d1, d2, 200.0, BookingStatus::Confirmed),
            booking(2, 2, d1, d2, 300.0, BookingStatus::Pending),
            booking(3, 1, d2, date!(2025 - 02 - 04), 100.0, BookingStatus::CheckedOut),
            booking(4, 2, d2, date!(2025 - 02 - 05), 300.0, BookingStatus::Cancelled),
        ];
        let window = StayRange::new(d1, date!(2025 - 02 - 11)).unwrap();

        let stats = compute(&rooms, &bookings, &window);
        assert_eq!(stats.available_rooms, 2);
        assert_eq!(stats.total_revenue, 300.0);
        assert_eq!(stats.average_price_per_night, Some(200.0));
        assert_eq!(stats.room_type_distribution["double"], 2);
        assert_eq!(stats.booking_status_distribution["cancelled"], 1);
        assert!(!stats.booking_status_distribution.contains_key("checked_in"));
    }

    #[test]
    fn test_occupancy_clips_to_window() {
        let rooms = vec![room(1, RoomType::Single, 80.0), room(2, RoomType::Single, 80.0)];
        let bookings = vec![
            // 2 of its 4 nights fall in the window
            booking(1, 1, date!(2025 - 01 - 30), date!(2025 - 02 - 03), 320.0, BookingStatus::Confirmed),
            booking(2, 2, date!(2025 - 02 - 05), date!(2025 - 02 - 08), 240.0, BookingStatus::Pending),
            booking(3, 2, date!(2025 - 02 - 01), date!(2025 - 02 - 04), 240.0, BookingStatus::Cancelled),
            // room 9 no longer exists
            booking(4, 9, date!(2025 - 02 - 01), date!(2025 - 02 - 04), 240.0, BookingStatus::Confirmed),
        ];
        let window = StayRange::new(date!(2025 - 02 - 01), date!(2025 - 02 - 11)).unwrap();

        let occ = occupancy(&rooms, &bookings, &window);
        assert_eq!(occ.booked_room_nights, 5);
        assert_eq!(occ.total_room_nights, 20);
        assert_eq!(occ.occupancy_rate, 0.25);
    }
}
