/**
 * HOTEL API - REST routes of the booking service
 *
 * Routes:
 * - /rooms, /rooms/{id}, /rooms/{id}/bookings, /rooms/availability
 * - /bookings, /bookings/{id}, /bookings/{id}/status?new_status=
 * - /stats?from=&to=
 *
 * Handlers stay thin: decode, call `HotelState`, wrap the answer in the
 * `{"message": ..., "<thing>": ...}` envelope.
 */

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use time::{Date, Duration, OffsetDateTime};
use workshop_kit::{ApiError, ApiResult, Id, QueryParams, Valid};

use crate::availability::{AvailabilityQuery, StayRange};
use crate::filters::{AvailabilityParams, BookingListQuery, RoomBookingsQuery, RoomListQuery, StatsParams, StatusParams};
use crate::models::{BookingInput, RoomInput};
use crate::state::SharedHotel;
use crate::stats::HotelStats;

/// Default length of the occupancy window of `/stats`
pub const OCCUPANCY_WINDOW_DAYS: i64 = 30;

#[derive(Clone)]
pub struct HotelApp {
    pub hotel: SharedHotel,
    /// Current day, swapped for a fixed date in tests
    pub today: fn() -> Date,
}

fn utc_today() -> Date {
    OffsetDateTime::now_utc().date()
}

impl HotelApp {
    pub fn new(hotel: SharedHotel) -> Self {
        Self { hotel, today: utc_today }
    }
}

pub fn build_router(app: HotelApp) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/availability", get(availability))
        .route("/rooms/{id}", get(get_room).put(update_room).delete(delete_room))
        .route("/rooms/{id}/bookings", get(room_bookings))
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/{id}", get(get_booking).put(update_booking).delete(delete_booking))
        .route("/bookings/{id}/status", put(update_status))
        .route("/stats", get(stats))
        .with_state(app)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Hotel Booking API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "rooms": "/rooms",
            "bookings": "/bookings",
            "availability": "/rooms/availability",
            "stats": "/stats",
            "health": "/health"
        }
    }))
}

// GET /rooms
async fn list_rooms(
    State(app): State<HotelApp>,
    QueryParams(query): QueryParams<RoomListQuery>,
) -> ApiResult<Json<Value>> {
    let page = query.apply(app.hotel.rooms())?;
    Ok(Json(page.into_json("rooms")))
}

// POST /rooms
async fn create_room(
    State(app): State<HotelApp>,
    Valid(input): Valid<RoomInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let room = app.hotel.create_room(input)?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Room created", "room": room }))))
}

// GET /rooms/{id}
async fn get_room(State(app): State<HotelApp>, Id(id): Id) -> ApiResult<Json<Value>> {
    let room = app.hotel.room(id)?;
    Ok(Json(json!({ "message": "Room found", "room": room })))
}

// PUT /rooms/{id}
async fn update_room(
    State(app): State<HotelApp>,
    Id(id): Id,
    Valid(input): Valid<RoomInput>,
) -> ApiResult<Json<Value>> {
    let room = app.hotel.update_room(id, input)?;
    Ok(Json(json!({ "message": "Room updated", "room": room })))
}

// DELETE /rooms/{id}
async fn delete_room(State(app): State<HotelApp>, Id(id): Id) -> ApiResult<Json<Value>> {
    let (room, cancelled) = app.hotel.delete_room(id)?;
    Ok(Json(json!({
        "message": "Room deleted and associated bookings cancelled",
        "room": room,
        "cancelled_bookings_count": cancelled,
    })))
}

// GET /rooms/{id}/bookings
async fn room_bookings(
    State(app): State<HotelApp>,
    Id(id): Id,
    QueryParams(query): QueryParams<RoomBookingsQuery>,
) -> ApiResult<Json<Value>> {
    app.hotel.room(id)?;
    let bookings = query.apply(id, app.hotel.bookings());
    Ok(Json(json!({
        "room_id": id,
        "total_bookings": bookings.len(),
        "bookings": bookings,
    })))
}

// GET /rooms/availability
async fn availability(
    State(app): State<HotelApp>,
    QueryParams(params): QueryParams<AvailabilityParams>,
) -> ApiResult<Json<Value>> {
    let stay = StayRange::new(params.check_in_date, params.check_out_date)?;
    if params.num_guests == Some(0) {
        return Err(ApiError::validation("num_guests", "must be >= 1"));
    }

    let query = AvailabilityQuery {
        num_guests: params.num_guests,
        room_type: params.room_type,
    };
    let rooms = app.hotel.availability(&stay, &query);
    Ok(Json(json!({
        "check_in_date": stay.check_in,
        "check_out_date": stay.check_out,
        "total_available": rooms.len(),
        "available_rooms": rooms,
    })))
}

// GET /bookings
async fn list_bookings(
    State(app): State<HotelApp>,
    QueryParams(query): QueryParams<BookingListQuery>,
) -> ApiResult<Json<Value>> {
    let page = query.apply(app.hotel.bookings())?;
    Ok(Json(page.into_json("bookings")))
}

// POST /bookings
async fn create_booking(
    State(app): State<HotelApp>,
    Valid(input): Valid<BookingInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let booking = app.hotel.create_booking(input, (app.today)())?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Booking created", "booking": booking }))))
}

// GET /bookings/{id}
async fn get_booking(State(app): State<HotelApp>, Id(id): Id) -> ApiResult<Json<Value>> {
    let booking = app.hotel.booking(id)?;
    Ok(Json(json!({ "message": "Booking found", "booking": booking })))
}

// PUT /bookings/{id}
async fn update_booking(
    State(app): State<HotelApp>,
    Id(id): Id,
    Valid(input): Valid<BookingInput>,
) -> ApiResult<Json<Value>> {
    let booking = app.hotel.update_booking(id, input, (app.today)())?;
    Ok(Json(json!({ "message": "Booking updated", "booking": booking })))
}

// DELETE /bookings/{id}
async fn delete_booking(State(app): State<HotelApp>, Id(id): Id) -> ApiResult<Json<Value>> {
    let booking = app.hotel.delete_booking(id)?;
    Ok(Json(json!({ "message": "Booking deleted", "booking": booking })))
}

// PUT /bookings/{id}/status?new_status=confirmed
async fn update_status(
    State(app): State<HotelApp>,
    Id(id): Id,
    QueryParams(params): QueryParams<StatusParams>,
) -> ApiResult<Json<Value>> {
    let booking = app.hotel.set_status(id, params.new_status)?;
    Ok(Json(json!({ "message": "Booking status updated", "booking": booking })))
}

// GET /stats
async fn stats(
    State(app): State<HotelApp>,
    QueryParams(params): QueryParams<StatsParams>,
) -> ApiResult<Json<HotelStats>> {
    let from = params.from.unwrap_or_else(app.today);
    let to = match params.to {
        Some(to) => to,
        None => from
            .checked_add(Duration::days(OCCUPANCY_WINDOW_DAYS))
            .ok_or_else(|| ApiError::validation("from", "too close to the last representable date"))?,
    };
    if to <= from {
        return Err(ApiError::validation("to", "must be after from"));
    }

    let window = StayRange { check_in: from, check_out: to };
    Ok(Json(app.hotel.stats(&window)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::HotelState;
    use std::sync::Arc;
    use time::macros::date;
    use workshop_kit::testing::{scratch_dir, TestClient};

    fn fixed_today() -> Date {
        date!(2025 - 01 - 15)
    }

    fn client() -> (tempfile::TempDir, TestClient) {
        let dir = scratch_dir();
        let hotel = Arc::new(HotelState::open(dir.path()).unwrap());
        let app = HotelApp { hotel, today: fixed_today };
        (dir, TestClient::new(build_router(app)))
    }

    fn room_body(number: &str) -> Value {
        json!({
            "room_number": number,
            "room_type": "double",
            "price_per_night": 120.0,
            "capacity": 2,
            "amenities": ["wifi", "tv"],
            "description": "Double room facing the sea"
        })
    }

    fn booking_body(room_id: u64, from: &str, to: &str) -> Value {
        json!({
            "room_id": room_id,
            "guest_name": "Ada Lovelace",
            "guest_email": "ada@example.com",
            "check_in_date": from,
            "check_out_date": to,
            "num_guests": 2
        })
    }

    #[tokio::test]
    async fn test_room_crud() {
        let (_dir, client) = client();

        let created = client.post("/rooms", &room_body("101")).await.expect(StatusCode::CREATED);
        assert_eq!(created["message"], "Room created");
        assert_eq!(created["room"]["id"], 1);
        assert_eq!(created["room"]["is_available"], true);

        let found = client.get("/rooms/1").await.expect(StatusCode::OK);
        assert_eq!(found["room"]["room_number"], "101");

        let mut body = room_body("101B");
        body["price_per_night"] = json!(150.0);
        let updated = client.put("/rooms/1", &body).await.expect(StatusCode::OK);
        assert_eq!(updated["room"]["price_per_night"], 150.0);
        assert_eq!(updated["room"]["id"], 1);

        let deleted = client.delete("/rooms/1").await.expect(StatusCode::OK);
        assert_eq!(deleted["cancelled_bookings_count"], 0);
        client.get("/rooms/1").await.expect(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_room_validation() {
        let (_dir, client) = client();

        let mut body = room_body("101");
        body["capacity"] = json!(11);
        let err = client.post("/rooms", &body).await.expect(StatusCode::BAD_REQUEST);
        assert_eq!(err["field"], "capacity");

        let mut body = room_body("101");
        body["room_type"] = json!("penthouse");
        client.post("/rooms", &body).await.expect(StatusCode::BAD_REQUEST);

        client.post_raw("/rooms", "{\"room_number\": ").await.expect(StatusCode::BAD_REQUEST);
        client.get("/rooms/abc").await.expect(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_availability_example() {
        let (_dir, client) = client();
        client.post("/rooms", &room_body("101")).await.expect(StatusCode::CREATED);

        let booking = client
            .post("/bookings", &booking_body(1, "2025-02-01", "2025-02-05"))
            .await
            .expect(StatusCode::CREATED);
        assert_eq!(booking["booking"]["status"], "pending");
        assert_eq!(booking["booking"]["total_price"], 480.0);

        let busy = client
            .get("/rooms/availability?check_in_date=2025-02-03&check_out_date=2025-02-06")
            .await
            .expect(StatusCode::OK);
        assert_eq!(busy["total_available"], 0);

        let free = client
            .get("/rooms/availability?check_in_date=2025-02-05&check_out_date=2025-02-08")
            .await
            .expect(StatusCode::OK);
        assert_eq!(free["total_available"], 1);
        assert_eq!(free["available_rooms"][0]["id"], 1);
        assert_eq!(free["available_rooms"][0]["nights"], 3);
        assert_eq!(free["available_rooms"][0]["total_price_for_stay"], 360.0);
    }

    #[tokio::test]
    async fn test_availability_rejects_reversed_range() {
        let (_dir, client) = client();
        let err = client
            .get("/rooms/availability?check_in_date=2025-02-05&check_out_date=2025-02-05")
            .await
            .expect(StatusCode::BAD_REQUEST);
        assert_eq!(err["field"], "check_out_date");
    }

    #[tokio::test]
    async fn test_double_booking_conflict() {
        let (_dir, client) = client();
        client.post("/rooms", &room_body("101")).await.expect(StatusCode::CREATED);
        client
            .post("/bookings", &booking_body(1, "2025-02-01", "2025-02-05"))
            .await
            .expect(StatusCode::CREATED);

        let err = client
            .post("/bookings", &booking_body(1, "2025-02-04", "2025-02-06"))
            .await
            .expect(StatusCode::CONFLICT);
        assert_eq!(err["detail"], "Room not available for the selected dates");

        client
            .post("/bookings", &booking_body(7, "2025-02-10", "2025-02-12"))
            .await
            .expect(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let (_dir, client) = client();
        client.post("/rooms", &room_body("101")).await.expect(StatusCode::CREATED);
        client
            .post("/bookings", &booking_body(1, "2025-02-01", "2025-02-05"))
            .await
            .expect(StatusCode::CREATED);

        let confirmed = client
            .put_empty("/bookings/1/status?new_status=confirmed")
            .await
            .expect(StatusCode::OK);
        assert_eq!(confirmed["booking"]["status"], "confirmed");

        client
            .put_empty("/bookings/1/status?new_status=checked_out")
            .await
            .expect(StatusCode::OK);
        client
            .put_empty("/bookings/1/status?new_status=pending")
            .await
            .expect(StatusCode::CONFLICT);
        client
            .put_empty("/bookings/1/status?new_status=lost")
            .await
            .expect(StatusCode::BAD_REQUEST);
        client
            .put_empty("/bookings/9/status?new_status=confirmed")
            .await
            .expect(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_booking_listing_and_room_bookings() {
        let (_dir, client) = client();
        client.post("/rooms", &room_body("101")).await.expect(StatusCode::CREATED);
        client.post("/rooms", &room_body("102")).await.expect(StatusCode::CREATED);
        for (room, from, to) in [(1, "2025-03-10", "2025-03-12"), (1, "2025-02-10", "2025-02-12"), (2, "2025-02-01", "2025-02-02")] {
            client.post("/bookings", &booking_body(room, from, to)).await.expect(StatusCode::CREATED);
        }

        let page = client.get("/bookings?room_id=1&sort_by=id&order=asc&limit=1").await.expect(StatusCode::OK);
        assert_eq!(page["total_count"], 2);
        assert_eq!(page["returned_count"], 1);
        assert_eq!(page["bookings"][0]["id"], 1);

        let per_room = client.get("/rooms/1/bookings").await.expect(StatusCode::OK);
        assert_eq!(per_room["total_bookings"], 2);
        assert_eq!(per_room["bookings"][0]["check_in_date"], "2025-02-10");

        client.get("/rooms/5/bookings").await.expect(StatusCode::NOT_FOUND);
        client.get("/bookings?limit=0").await.expect(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_room_cancels_bookings() {
        let (_dir, client) = client();
        client.post("/rooms", &room_body("101")).await.expect(StatusCode::CREATED);
        client
            .post("/bookings", &booking_body(1, "2025-02-01", "2025-02-05"))
            .await
            .expect(StatusCode::CREATED);

        let deleted = client.delete("/rooms/1").await.expect(StatusCode::OK);
        assert_eq!(deleted["cancelled_bookings_count"], 1);

        let booking = client.get("/bookings/1").await.expect(StatusCode::OK);
        assert_eq!(booking["booking"]["status"], "cancelled");
    }

    #[tokio::test]
    async fn test_stats() {
        let (_dir, client) = client();
        client.post("/rooms", &room_body("101")).await.expect(StatusCode::CREATED);
        client
            .post("/bookings", &booking_body(1, "2025-01-20", "2025-01-23"))
            .await
            .expect(StatusCode::CREATED);
        client
            .put_empty("/bookings/1/status?new_status=confirmed")
            .await
            .expect(StatusCode::OK);

        let stats = client.get("/stats").await.expect(StatusCode::OK);
        assert_eq!(stats["total_rooms"], 1);
        assert_eq!(stats["total_revenue"], 360.0);
        assert_eq!(stats["booking_status_distribution"]["confirmed"], 1);
        assert_eq!(stats["occupancy"]["from"], "2025-01-15");
        assert_eq!(stats["occupancy"]["booked_room_nights"], 3);
        assert_eq!(stats["occupancy"]["total_room_nights"], 30);
        assert_eq!(stats["occupancy"]["occupancy_rate"], 0.1);

        client.get("/stats?from=2025-02-01&to=2025-01-01").await.expect(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_checked_out_booking_keeps_its_nights() {
        let (_dir, client) = client();
        client.post("/rooms", &room_body("101")).await.expect(StatusCode::CREATED);
        let stay = booking_body(1, "2025-02-01", "2025-02-05");
        client.post("/bookings", &stay).await.expect(StatusCode::CREATED);
        client
            .put_empty("/bookings/1/status?new_status=checked_out")
            .await
            .expect(StatusCode::OK);

        client.post("/bookings", &stay).await.expect(StatusCode::CONFLICT);
        let free = client
            .get("/rooms/availability?check_in_date=2025-02-03&check_out_date=2025-02-06")
            .await
            .expect(StatusCode::OK);
        assert_eq!(free["total_available"], 0);

        let stats = client.get("/stats?from=2025-02-01&to=2025-02-05").await.expect(StatusCode::OK);
        assert_eq!(stats["occupancy"]["booked_room_nights"], 4);
        assert_eq!(stats["occupancy"]["occupancy_rate"], 1.0);
    }

    #[tokio::test]
    async fn test_stats_window_at_the_end_of_the_calendar() {
        let (_dir, client) = client();
        client.post("/rooms", &room_body("101")).await.expect(StatusCode::CREATED);

        let err = client.get("/stats?from=9999-12-20").await.expect(StatusCode::BAD_REQUEST);
        assert_eq!(err["field"], "from");

        let stats = client
            .get("/stats?from=9999-12-20&to=9999-12-31")
            .await
            .expect(StatusCode::OK);
        assert_eq!(stats["occupancy"]["total_room_nights"], 11);
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let (_dir, client) = client();
        let root = client.get("/").await.expect(StatusCode::OK);
        assert_eq!(root["message"], "Hotel Booking API");

        let dir = scratch_dir();
        let hotel = Arc::new(HotelState::open(dir.path()).unwrap());
        let router = workshop_kit::server::with_layers(
            build_router(HotelApp::new(hotel)),
            &workshop_kit::ServiceConfig::default(),
        );
        let health = TestClient::new(router).get("/health").await.expect(StatusCode::OK);
        assert_eq!(health, "ok");
    }
}
