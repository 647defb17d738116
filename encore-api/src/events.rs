use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use encore_catalog::{Event, EventType};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/events", get(list_events))
        .route("/v1/events/{id}", get(get_event))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/events", post(create_event))
        .route("/v1/events/{id}", put(update_event))
        .route("/v1/events/{id}", delete(delete_event))
}

async fn list_events(State(state): State<AppState>) -> Json<Vec<Event>> {
    let catalog = state.catalog.read().await;
    Json(catalog.events().into_iter().cloned().collect())
}

async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, AppError> {
    let catalog = state.catalog.read().await;
    let event = catalog
        .event(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Event not found: {}", id)))?;
    Ok(Json(event))
}

#[derive(Debug, Deserialize)]
struct EventRequest {
    title: String,
    event_type: EventType,
    date: NaiveDate,
    time: NaiveTime,
    venue_id: Uuid,
    company: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    is_featured: bool,
    price: String,
    #[serde(default)]
    tags: Vec<String>,
}

impl EventRequest {
    fn into_event(self, id: Uuid) -> Result<Event, AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Event title is required".into()));
        }
        Ok(Event {
            id,
            title: self.title,
            event_type: self.event_type,
            date: self.date,
            time: self.time,
            venue_id: self.venue_id,
            company: self.company,
            description: self.description,
            image_url: self.image_url,
            is_featured: self.is_featured,
            price: self.price,
            tags: self.tags,
        })
    }
}

async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<EventRequest>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = req.into_event(Uuid::new_v4())?;
    let mut catalog = state.catalog.write().await;
    let id = catalog.add_event(event)?;
    let (_, events, _) = catalog.export();
    state.store.save_events(&events).await?;
    let created = catalog.event(&id).cloned();
    Ok((
        StatusCode::CREATED,
        Json(created.ok_or_else(|| AppError::Internal("event vanished after insert".into()))?),
    ))
}

async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EventRequest>,
) -> Result<Json<Event>, AppError> {
    let event = req.into_event(id)?;
    let mut catalog = state.catalog.write().await;
    catalog.update_event(&id, event)?;
    let (_, events, _) = catalog.export();
    state.store.save_events(&events).await?;
    let updated = catalog
        .event(&id)
        .cloned()
        .ok_or_else(|| AppError::Internal("event vanished after update".into()))?;
    Ok(Json(updated))
}

async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut catalog = state.catalog.write().await;
    catalog.remove_event(&id)?;
    let (_, events, _) = catalog.export();
    state.store.save_events(&events).await?;
    Ok(StatusCode::NO_CONTENT)
}
