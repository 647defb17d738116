use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use encore_booking::{Booking, BookingError, SeatStatus};
use encore_catalog::{Event, Venue};
use encore_shared::{Actor, CustomerInfo, SeatId};
use encore_store::BlockedSeats;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::claims_from_headers;
use crate::state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/events/{id}/seats", get(seat_map))
        .route("/v1/events/{id}/holds", post(hold_seat).delete(release))
        .route("/v1/events/{id}/bookings", post(confirm_booking))
        .route("/v1/bookings", get(find_bookings))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/events/{id}/seats/{seat}/block", patch(toggle_block))
        .route("/v1/events/{id}/bookings", get(list_event_bookings))
}

async fn event_venue(state: &AppState, event_id: &Uuid) -> Result<(Event, Venue), AppError> {
    let catalog = state.catalog.read().await;
    let (event, venue) = catalog.event_venue(event_id)?;
    Ok((event.clone(), venue.clone()))
}

/// The capability for seat selection. Guests get a throwaway customer
/// identity; a valid staff token lifts the per-booking seat cap.
fn actor_for(state: &AppState, headers: &HeaderMap) -> Actor {
    match claims_from_headers(state, headers) {
        Some(claims) => claims.actor(),
        None => Actor::Customer {
            id: format!("guest-{}", Uuid::new_v4()),
        },
    }
}

// --- Seat map ---

#[derive(Debug, Serialize)]
struct SeatView {
    seat: SeatId,
    row: u32,
    number: u32,
    status: SeatStatus,
}

#[derive(Debug, Serialize)]
struct SeatMapResponse {
    event_id: Uuid,
    venue_name: String,
    capacity: u32,
    seats: Vec<SeatView>,
}

async fn seat_map(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<SeatMapResponse>, AppError> {
    let (_, venue) = event_venue(&state, &event_id).await?;
    let mut booking = state.booking.lock().await;
    let seats = booking
        .seat_map(event_id, &venue)
        .into_iter()
        .map(|(seat, status)| SeatView {
            seat,
            row: seat.row,
            number: seat.number,
            status,
        })
        .collect();
    Ok(Json(SeatMapResponse {
        event_id,
        venue_name: venue.name.clone(),
        capacity: venue.capacity(),
        seats,
    }))
}

// --- Holds ---

#[derive(Debug, Deserialize)]
struct HoldRequest {
    /// Omitted on the first hold; the response carries the new session id.
    session_id: Option<Uuid>,
    seat: SeatId,
}

#[derive(Debug, Serialize)]
struct HoldResponse {
    session_id: Uuid,
    seats: Vec<SeatId>,
}

async fn hold_seat(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<HoldRequest>,
) -> Result<Json<HoldResponse>, AppError> {
    let (_, venue) = event_venue(&state, &event_id).await?;
    let mut booking = state.booking.lock().await;

    let session_id = match req.session_id {
        Some(id) => {
            ensure_session_event(&booking, &id, event_id)?;
            id
        }
        None => booking.start_session(event_id, actor_for(&state, &headers)),
    };

    booking.select_seat(session_id, req.seat, &venue)?;
    let seats = booking
        .session(&session_id)
        .map(|s| s.seats().to_vec())
        .unwrap_or_default();
    Ok(Json(HoldResponse { session_id, seats }))
}

#[derive(Debug, Deserialize)]
struct ReleaseRequest {
    session_id: Uuid,
    /// Absent: abandon the whole session and release every hold.
    seat: Option<SeatId>,
}

async fn release(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<ReleaseRequest>,
) -> Result<StatusCode, AppError> {
    let mut booking = state.booking.lock().await;
    ensure_session_event(&booking, &req.session_id, event_id)?;
    match req.seat {
        Some(seat) => booking.deselect_seat(req.session_id, seat)?,
        None => booking.abandon_session(req.session_id)?,
    }
    Ok(StatusCode::NO_CONTENT)
}

fn ensure_session_event(
    booking: &encore_booking::BookingService,
    session_id: &Uuid,
    event_id: Uuid,
) -> Result<(), AppError> {
    let session = booking
        .session(session_id)
        .ok_or_else(|| AppError::NotFound(format!("session {}", session_id)))?;
    if session.event_id != event_id {
        return Err(AppError::Validation(
            "Session belongs to a different event".into(),
        ));
    }
    Ok(())
}

// --- Confirmation ---

#[derive(Debug, Deserialize)]
struct ConfirmRequest {
    session_id: Uuid,
    customer: CustomerInfo,
}

async fn confirm_booking(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<ConfirmRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let (event, venue) = event_venue(&state, &event_id).await?;
    let mut booking = state.booking.lock().await;
    ensure_session_event(&booking, &req.session_id, event_id)?;

    let result = booking
        .confirm(req.session_id, req.customer, &event, &venue)
        .await;

    // A notification failure still committed the seats and appended to the
    // ledger; persist before reporting anything to the caller.
    match &result {
        Ok(_) | Err(BookingError::Notification(_)) => {
            state.store.save_bookings(&booking.export_bookings()).await?;
        }
        Err(_) => {}
    }

    let created = result?;
    Ok((StatusCode::CREATED, Json(created)))
}

// --- Lookups ---

#[derive(Debug, Deserialize)]
struct BookingQuery {
    reference: Option<String>,
    email: Option<String>,
}

/// Reference lookups are open (the reference itself is the secret). Email
/// lookups need a token for that same address, or an admin one.
async fn find_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<Booking>>, AppError> {
    let booking = state.booking.lock().await;
    if let Some(reference) = &query.reference {
        let found = booking
            .find_by_reference(reference)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Booking not found: {}", reference)))?;
        return Ok(Json(vec![found]));
    }
    if let Some(email) = &query.email {
        let claims = claims_from_headers(&state, &headers)
            .ok_or_else(|| AppError::Unauthorized("Email lookups require a token".into()))?;
        if !claims.role.is_admin() && !claims.email.eq_ignore_ascii_case(email) {
            return Err(AppError::Forbidden(
                "You can only look up your own bookings".into(),
            ));
        }
        let found = booking
            .list_by_customer_email(email)
            .into_iter()
            .cloned()
            .collect();
        return Ok(Json(found));
    }
    Err(AppError::Validation(
        "Provide a reference or email query parameter".into(),
    ))
}

/// Admin view of everything booked for one event, in creation order.
async fn list_event_bookings(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<Booking>>, AppError> {
    {
        let catalog = state.catalog.read().await;
        if catalog.event(&event_id).is_none() {
            return Err(AppError::NotFound(format!("Event not found: {}", event_id)));
        }
    }
    let booking = state.booking.lock().await;
    let bookings = booking
        .list_by_event(event_id)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(bookings))
}

// --- Admin seat blocking ---

#[derive(Debug, Deserialize)]
struct BlockRequest {
    blocked: bool,
}

#[derive(Debug, Serialize)]
struct BlockResponse {
    seat: SeatId,
    status: SeatStatus,
}

async fn toggle_block(
    State(state): State<AppState>,
    Path((event_id, seat)): Path<(Uuid, SeatId)>,
    headers: HeaderMap,
    Json(req): Json<BlockRequest>,
) -> Result<Json<BlockResponse>, AppError> {
    let (_, venue) = event_venue(&state, &event_id).await?;
    let actor = actor_for(&state, &headers);
    let mut booking = state.booking.lock().await;
    let status = booking.set_seat_blocked(&actor, event_id, seat, req.blocked, &venue)?;

    let event_ids: Vec<Uuid> = {
        let catalog = state.catalog.read().await;
        catalog.events().iter().map(|e| e.id).collect()
    };
    let blocked: Vec<BlockedSeats> = event_ids
        .into_iter()
        .map(|id| BlockedSeats {
            event_id: id,
            seats: booking.blocked_seats(id),
        })
        .filter(|b| !b.seats.is_empty())
        .collect();
    state.store.save_blocked_seats(&blocked).await?;

    Ok(Json(BlockResponse { seat, status }))
}
