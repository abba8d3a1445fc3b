use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use validator::Validate;
use workshop_kit::{Normalize, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Single,
    Double,
    Suite,
    Deluxe,
    Presidential,
}

impl RoomType {
    pub const ALL: [RoomType; 5] = [
        RoomType::Single,
        RoomType::Double,
        RoomType::Suite,
        RoomType::Deluxe,
        RoomType::Presidential,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RoomType::Single => "single",
            RoomType::Double => "double",
            RoomType::Suite => "suite",
            RoomType::Deluxe => "deluxe",
            RoomType::Presidential => "presidential",
        }
    }
}

/// Booking lifecycle: pending -> confirmed -> checked_in -> checked_out,
/// or cancelled from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::CheckedIn,
        BookingStatus::CheckedOut,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::CheckedOut => "checked_out",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Every booking except a cancelled one keeps its nights taken,
    /// a checked-out stay included
    pub fn holds_room(self) -> bool {
        self != BookingStatus::Cancelled
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::CheckedOut | BookingStatus::Cancelled)
    }

    /// Statuses counted in the revenue figure
    pub fn earns_revenue(self) -> bool {
        matches!(
            self,
            BookingStatus::Confirmed | BookingStatus::CheckedIn | BookingStatus::CheckedOut
        )
    }

    /// Terminal bookings are frozen, everything else may move freely
    pub fn can_transition(self, _to: BookingStatus) -> bool {
        !self.is_terminal()
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: u64,
    pub room_number: String,
    pub room_type: RoomType,
    pub price_per_night: f64,
    pub capacity: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    pub description: String,
}

impl Record for Room {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Room {
    pub fn from_input(id: u64, input: RoomInput) -> Self {
        Self {
            id,
            room_number: input.room_number,
            room_type: input.room_type,
            price_per_night: input.price_per_night,
            capacity: input.capacity,
            amenities: input.amenities,
            is_available: input.is_available,
            description: input.description,
        }
    }
}

/// Body of `POST /rooms` and `PUT /rooms/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RoomInput {
    #[validate(length(min = 1, max = 20))]
    pub room_number: String,
    pub room_type: RoomType,
    #[validate(range(exclusive_min = 0.0))]
    pub price_per_night: f64,
    #[validate(range(min = 1, max = 10))]
    pub capacity: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[validate(length(min = 10, max = 500))]
    pub description: String,
}

impl Normalize for RoomInput {
    fn normalize(mut self) -> Self {
        self.room_number = self.room_number.trim().to_string();
        self.description = self.description.trim().to_string();

        // amenities behave as a set, first occurrence wins
        let mut amenities: Vec<String> = Vec::with_capacity(self.amenities.len());
        for amenity in self.amenities {
            let amenity = amenity.trim().to_string();
            if !amenity.is_empty() && !amenities.contains(&amenity) {
                amenities.push(amenity);
            }
        }
        self.amenities = amenities;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: u64,
    pub room_id: u64,
    pub guest_name: String,
    pub guest_email: String,
    pub check_in_date: Date,
    pub check_out_date: Date,
    pub num_guests: u32,
    pub total_price: f64,
    pub status: BookingStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub special_requests: Option<String>,
}

impl Record for Booking {
    fn id(&self) -> u64 {
        self.id
    }
}

/// Body of `POST /bookings` and `PUT /bookings/{id}`.
/// Date order, past check-in and capacity are checked against the room
/// and the current day when the booking is applied.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingInput {
    #[validate(range(min = 1))]
    pub room_id: u64,
    #[validate(length(min = 2, max = 100))]
    pub guest_name: String,
    #[validate(email, length(min = 5, max = 100))]
    pub guest_email: String,
    pub check_in_date: Date,
    pub check_out_date: Date,
    #[validate(range(min = 1, max = 10))]
    pub num_guests: u32,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub special_requests: Option<String>,
}

impl Normalize for BookingInput {
    fn normalize(mut self) -> Self {
        self.guest_name = self.guest_name.trim().to_string();
        self.guest_email = self.guest_email.trim().to_lowercase();
        self.special_requests = self
            .special_requests
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }
}
