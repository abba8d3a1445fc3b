/**
 * HOTEL STATE - rooms and bookings with their business rules
 *
 * ROLE:
 * Owns the two collections for the whole process lifetime. Every mutation
 * goes through here so the cross-collection rules hold:
 * - a booking references an existing, open room with enough capacity
 * - no two non-cancelled bookings of one room overlap
 * - a room never holds fewer places than an active booking needs
 * - checked-out and cancelled bookings are frozen
 *
 * LOCK ORDER: rooms, then bookings. Checks and writes on bookings run
 * inside the rooms lock, so a concurrent request cannot slip a booking
 * between the availability check and the insert.
 */

use std::path::Path;
use std::sync::Arc;
use time::{Date, OffsetDateTime};
use tracing::info;
use workshop_kit::store::{commit_both, next_id};
use workshop_kit::{ApiError, ApiResult, JsonCollection, StoreError};

use crate::availability::{find_available, is_room_free, stay_price, AvailabilityQuery, AvailableRoom, StayRange};
use crate::models::{Booking, BookingInput, BookingStatus, Room, RoomInput};
use crate::stats::{self, HotelStats};

pub const ROOMS_FILE: &str = "rooms.json";
pub const BOOKINGS_FILE: &str = "bookings.json";

pub type SharedHotel = Arc<HotelState>;

#[derive(Debug)]
pub struct HotelState {
    rooms: JsonCollection<Room>,
    bookings: JsonCollection<Booking>,
}

fn room_not_found(id: u64) -> ApiError {
    ApiError::not_found(format!("Room with ID {id} not found"))
}

fn booking_not_found(id: u64) -> ApiError {
    ApiError::not_found(format!("Booking with ID {id} not found"))
}

impl HotelState {
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            rooms: JsonCollection::open(data_dir.join(ROOMS_FILE))?,
            bookings: JsonCollection::open(data_dir.join(BOOKINGS_FILE))?,
        })
    }

    pub fn rooms(&self) -> Vec<Room> {
        self.rooms.snapshot()
    }

    pub fn bookings(&self) -> Vec<Booking> {
        self.bookings.snapshot()
    }

    pub fn room(&self, id: u64) -> ApiResult<Room> {
        self.rooms.find(id).ok_or_else(|| room_not_found(id))
    }

    pub fn booking(&self, id: u64) -> ApiResult<Booking> {
        self.bookings.find(id).ok_or_else(|| booking_not_found(id))
    }

    // ---- rooms ----

    pub fn create_room(&self, input: RoomInput) -> ApiResult<Room> {
        let room = self.rooms.transact(|rooms| {
            ensure_unique_number(rooms, &input.room_number, None)?;
            let room = Room::from_input(next_id(rooms), input);
            rooms.push(room.clone());
            Ok::<_, ApiError>(room)
        })?;
        info!("[rooms] created room {} (#{})", room.room_number, room.id);
        Ok(room)
    }

    /// Full replace, the id is kept
    pub fn update_room(&self, id: u64, input: RoomInput) -> ApiResult<Room> {
        self.rooms.transact(|rooms| -> ApiResult<Room> {
            ensure_unique_number(rooms, &input.room_number, Some(id))?;
            let slot = rooms
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| room_not_found(id))?;
            self.bookings
                .read(|bookings| ensure_fits_bookings(bookings, id, input.capacity))?;
            *slot = Room::from_input(id, input);
            Ok(slot.clone())
        })
    }

    /// Removes the room and cancels its active bookings. Terminal bookings
    /// stay as they are. Returns the room and the number of cancelled bookings.
    pub fn delete_room(&self, id: u64) -> ApiResult<(Room, usize)> {
        let mut rooms = self.rooms.draft();
        let pos = rooms
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| room_not_found(id))?;
        let room = rooms.remove(pos);

        let mut bookings = self.bookings.draft();
        let mut cancelled = 0;
        for booking in bookings
            .iter_mut()
            .filter(|b| b.room_id == id && !b.status.is_terminal())
        {
            booking.status = BookingStatus::Cancelled;
            cancelled += 1;
        }
        commit_both(rooms, bookings)?;

        info!("[rooms] deleted room #{id}, {cancelled} booking(s) cancelled");
        Ok((room, cancelled))
    }

    pub fn availability(&self, stay: &StayRange, query: &AvailabilityQuery) -> Vec<AvailableRoom> {
        self.rooms
            .read(|rooms| self.bookings.read(|bookings| find_available(rooms, bookings, stay, query)))
    }

    pub fn stats(&self, window: &StayRange) -> HotelStats {
        self.rooms
            .read(|rooms| self.bookings.read(|bookings| stats::compute(rooms, bookings, window)))
    }

    // ---- bookings ----

    /// Books a room. `today` bounds the earliest accepted check-in.
    pub fn create_booking(&self, input: BookingInput, today: Date) -> ApiResult<Booking> {
        let stay = StayRange::new(input.check_in_date, input.check_out_date)?;
        ensure_not_past(stay.check_in, today)?;

        let booking = self.rooms.read(|rooms| -> ApiResult<Booking> {
            let room = rooms
                .iter()
                .find(|r| r.id == input.room_id)
                .ok_or_else(|| room_not_found(input.room_id))?;
            if !room.is_available {
                return Err(closed(room));
            }
            ensure_capacity(room, input.num_guests)?;

            self.bookings.transact(|bookings| {
                if !is_room_free(bookings, room.id, &stay, None) {
                    return Err(unavailable());
                }
                let booking = Booking {
                    id: next_id(bookings),
                    room_id: room.id,
                    guest_name: input.guest_name,
                    guest_email: input.guest_email,
                    check_in_date: stay.check_in,
                    check_out_date: stay.check_out,
                    num_guests: input.num_guests,
                    total_price: stay_price(room, &stay),
                    status: BookingStatus::Pending,
                    created_at: OffsetDateTime::now_utc(),
                    special_requests: input.special_requests,
                };
                bookings.push(booking.clone());
                Ok(booking)
            })
        })?;

        info!(
            "[bookings] booking #{} room #{} {}..{}",
            booking.id, booking.room_id, booking.check_in_date, booking.check_out_date
        );
        Ok(booking)
    }

    /// Full replace of the guest / stay fields. Status and creation time are
    /// kept and the price is recomputed. The past check-in rule only applies
    /// when the check-in date moves.
    pub fn update_booking(&self, id: u64, input: BookingInput, today: Date) -> ApiResult<Booking> {
        let stay = StayRange::new(input.check_in_date, input.check_out_date)?;

        self.rooms.read(|rooms| -> ApiResult<Booking> {
            let room = rooms
                .iter()
                .find(|r| r.id == input.room_id)
                .ok_or_else(|| room_not_found(input.room_id))?;
            ensure_capacity(room, input.num_guests)?;

            self.bookings.transact(|bookings| {
                let current = bookings
                    .iter()
                    .find(|b| b.id == id)
                    .ok_or_else(|| booking_not_found(id))?;
                if current.check_in_date != stay.check_in {
                    ensure_not_past(stay.check_in, today)?;
                }
                if current.room_id != room.id && !room.is_available {
                    return Err(closed(room));
                }
                if current.status.holds_room() && !is_room_free(bookings, room.id, &stay, Some(id)) {
                    return Err(unavailable());
                }

                let slot = bookings
                    .iter_mut()
                    .find(|b| b.id == id)
                    .ok_or_else(|| booking_not_found(id))?;
                slot.room_id = room.id;
                slot.guest_name = input.guest_name;
                slot.guest_email = input.guest_email;
                slot.check_in_date = stay.check_in;
                slot.check_out_date = stay.check_out;
                slot.num_guests = input.num_guests;
                slot.total_price = stay_price(room, &stay);
                slot.special_requests = input.special_requests;
                Ok(slot.clone())
            })
        })
    }

    pub fn delete_booking(&self, id: u64) -> ApiResult<Booking> {
        let booking = self.bookings.transact(|bookings| {
            let pos = bookings
                .iter()
                .position(|b| b.id == id)
                .ok_or_else(|| booking_not_found(id))?;
            Ok::<_, ApiError>(bookings.remove(pos))
        })?;
        info!("[bookings] deleted booking #{id}");
        Ok(booking)
    }

    /// Moves a booking to `new_status`; terminal bookings refuse any change
    pub fn set_status(&self, id: u64, new_status: BookingStatus) -> ApiResult<Booking> {
        let booking = self.bookings.transact(|bookings| {
            let booking = bookings
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or_else(|| booking_not_found(id))?;
            if !booking.status.can_transition(new_status) {
                return Err(ApiError::conflict(format!(
                    "Booking {id} is {} and cannot move to {}",
                    booking.status.as_str(),
                    new_status.as_str()
                )));
            }
            booking.status = new_status;
            Ok(booking.clone())
        })?;
        info!("[bookings] booking #{id} -> {}", new_status.as_str());
        Ok(booking)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.rooms.flush()?;
        self.bookings.flush()
    }
}

fn closed(room: &Room) -> ApiError {
    ApiError::conflict(format!("Room {} is closed for booking", room.room_number))
}

fn unavailable() -> ApiError {
    ApiError::conflict("Room not available for the selected dates")
}

fn ensure_unique_number(rooms: &[Room], number: &str, except: Option<u64>) -> ApiResult<()> {
    if rooms.iter().any(|r| r.room_number == number && Some(r.id) != except) {
        return Err(ApiError::conflict(format!("Room number {number} already exists")));
    }
    Ok(())
}

fn ensure_not_past(check_in: Date, today: Date) -> ApiResult<()> {
    if check_in < today {
        return Err(ApiError::validation(
            "check_in_date",
            "Check-in date cannot be in the past",
        ));
    }
    Ok(())
}

/// Active bookings of `room_id` must still fit in `capacity`
fn ensure_fits_bookings(bookings: &[Booking], room_id: u64, capacity: u32) -> ApiResult<()> {
    let needed = bookings
        .iter()
        .filter(|b| b.room_id == room_id && !b.status.is_terminal())
        .map(|b| b.num_guests)
        .max()
        .unwrap_or(0);
    if needed > capacity {
        return Err(ApiError::validation(
            "capacity",
            format!("An active booking of this room has {needed} guests"),
        ));
    }
    Ok(())
}

fn ensure_capacity(room: &Room, num_guests: u32) -> ApiResult<()> {
    if num_guests > room.capacity {
        return Err(ApiError::validation(
            "num_guests",
            format!("Room capacity is {}, but {num_guests} guests requested", room.capacity),
        ));
    }
    Ok(())
}
