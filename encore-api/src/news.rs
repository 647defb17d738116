use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use encore_catalog::NewsItem;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/v1/news", get(list_news))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/news", post(create_news))
        .route("/v1/news/{id}", put(update_news))
        .route("/v1/news/{id}", delete(delete_news))
}

async fn list_news(State(state): State<AppState>) -> Json<Vec<NewsItem>> {
    let catalog = state.catalog.read().await;
    Json(catalog.news().into_iter().cloned().collect())
}

#[derive(Debug, Deserialize)]
struct NewsRequest {
    title: String,
    body: String,
    #[serde(default)]
    image_url: Option<String>,
}

async fn create_news(
    State(state): State<AppState>,
    Json(req): Json<NewsRequest>,
) -> Result<(StatusCode, Json<NewsItem>), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("News title is required".into()));
    }
    let item = NewsItem::new(req.title, req.body, req.image_url);
    let mut catalog = state.catalog.write().await;
    let id = catalog.add_news(item);
    let (_, _, news) = catalog.export();
    state.store.save_news(&news).await?;
    let created = catalog
        .news()
        .into_iter()
        .find(|n| n.id == id)
        .cloned()
        .ok_or_else(|| AppError::Internal("news item vanished after insert".into()))?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_news(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<NewsRequest>,
) -> Result<Json<NewsItem>, AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("News title is required".into()));
    }
    let item = NewsItem::new(req.title, req.body, req.image_url);
    let mut catalog = state.catalog.write().await;
    catalog.update_news(&id, item)?;
    let (_, _, news) = catalog.export();
    state.store.save_news(&news).await?;
    let updated = catalog
        .news()
        .into_iter()
        .find(|n| n.id == id)
        .cloned()
        .ok_or_else(|| AppError::Internal("news item vanished after update".into()))?;
    Ok(Json(updated))
}

async fn delete_news(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut catalog = state.catalog.write().await;
    catalog.remove_news(&id)?;
    let (_, _, news) = catalog.export();
    state.store.save_news(&news).await?;
    Ok(StatusCode::NO_CONTENT)
}
