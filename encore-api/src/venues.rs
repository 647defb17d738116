use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use encore_catalog::Venue;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/venues", get(list_venues))
        .route("/v1/venues/{id}", get(get_venue))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/venues", post(create_venue))
        .route("/v1/venues/{id}", put(update_venue))
        .route("/v1/venues/{id}", delete(delete_venue))
        .route("/v1/venues/{id}/layout", patch(edit_layout))
}

async fn list_venues(State(state): State<AppState>) -> Json<Vec<Venue>> {
    let catalog = state.catalog.read().await;
    Json(catalog.venues().into_iter().cloned().collect())
}

async fn get_venue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Venue>, AppError> {
    let catalog = state.catalog.read().await;
    let venue = catalog
        .venue(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Venue not found: {}", id)))?;
    Ok(Json(venue))
}

#[derive(Debug, Deserialize)]
struct CreateVenueRequest {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    location: String,
    /// Explicit per-row seat counts; rows with 0 seats become gaps.
    seat_counts: Vec<u32>,
}

async fn create_venue(
    State(state): State<AppState>,
    Json(req): Json<CreateVenueRequest>,
) -> Result<(StatusCode, Json<Venue>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("Venue name is required".into()));
    }
    let venue = Venue::with_rows(req.name, req.description, req.location, &req.seat_counts)?;
    let mut catalog = state.catalog.write().await;
    let id = catalog.add_venue(venue);
    let (venues, _, _) = catalog.export();
    state.store.save_venues(&venues).await?;
    let created = catalog
        .venue(&id)
        .cloned()
        .ok_or_else(|| AppError::Internal("venue vanished after insert".into()))?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
struct UpdateVenueRequest {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    location: String,
}

/// Rename/redescribe only; the seating plan is edited through the layout
/// endpoint so seat references in existing bookings stay meaningful.
async fn update_venue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateVenueRequest>,
) -> Result<Json<Venue>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("Venue name is required".into()));
    }
    let mut catalog = state.catalog.write().await;
    let venue = catalog.venue_mut(&id)?;
    venue.name = req.name;
    venue.description = req.description;
    venue.location = req.location;
    let updated = venue.clone();
    let (venues, _, _) = catalog.export();
    state.store.save_venues(&venues).await?;
    Ok(Json(updated))
}

/// Layout edits, mirroring the admin panel's controls. Fields are applied
/// in declaration order; absent fields leave the plan alone.
#[derive(Debug, Deserialize)]
struct LayoutEditRequest {
    /// Grow or shrink the plan; new rows get `default_seat_count` seats.
    row_count: Option<u32>,
    #[serde(default = "default_new_row_seats")]
    default_seat_count: u32,
    /// Overwrite every row with the same seat count.
    uniform_seat_count: Option<u32>,
    /// Set single rows' seat counts; 0 turns a row into a gap.
    #[serde(default)]
    rows: Vec<RowEdit>,
}

#[derive(Debug, Deserialize)]
struct RowEdit {
    row_number: u32,
    seat_count: u32,
}

fn default_new_row_seats() -> u32 {
    10
}

async fn edit_layout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(edit): Json<LayoutEditRequest>,
) -> Result<Json<Venue>, AppError> {
    let mut catalog = state.catalog.write().await;
    let venue = catalog.venue_mut(&id)?;
    if let Some(row_count) = edit.row_count {
        venue.set_row_count(row_count, edit.default_seat_count)?;
    }
    if let Some(seat_count) = edit.uniform_seat_count {
        venue.set_uniform_seat_count(seat_count)?;
    }
    for row in &edit.rows {
        venue.set_row_seat_count(row.row_number, row.seat_count)?;
    }
    let updated = venue.clone();
    let (venues, _, _) = catalog.export();
    state.store.save_venues(&venues).await?;
    Ok(Json(updated))
}

async fn delete_venue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut catalog = state.catalog.write().await;
    catalog.remove_venue(&id)?;
    let (venues, _, _) = catalog.export();
    state.store.save_venues(&venues).await?;
    Ok(StatusCode::NO_CONTENT)
}
