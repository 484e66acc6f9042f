//! Analytics event handlers. Create is the widget ingest path (public);
//! events are immutable so there is no update route.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;

use leadbay_core::page::Page;
use leadbay_core::store::{Backend, EventStore};
use leadbay_types::event::{CreateEvent, Event};

use crate::http::error::AppError;
use crate::http::extractors::Authenticated;
use crate::http::query::EventListQuery;
use crate::http::response::ApiResponse;
use crate::state::AppState;

use super::parse_id;

/// POST /api/v1/events - Record a widget event (public).
pub async fn create_event<B: Backend>(
    State(state): State<AppState<B>>,
    Json(body): Json<CreateEvent>,
) -> Result<ApiResponse<Event>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let event = state.backend.events().create(body).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let link = format!("/api/v1/events/{}", event.id);
    Ok(ApiResponse::success(event, request_id, elapsed).with_link("self", &link))
}

/// GET /api/v1/events - List events.
pub async fn list_events<B: Backend>(
    State(state): State<AppState<B>>,
    _auth: Authenticated,
    Query(query): Query<EventListQuery>,
) -> Result<ApiResponse<Page<Event>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let filter = query.into_filter()?;
    let page = state.backend.events().list(&filter).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(ApiResponse::success(page, request_id, elapsed).with_link("self", "/api/v1/events"))
}

/// GET /api/v1/events/:id - Get one event.
pub async fn get_event<B: Backend>(
    State(state): State<AppState<B>>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<ApiResponse<Event>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let id = parse_id(&id)?;
    let event = state
        .backend
        .events()
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound("event"))?;
    let elapsed = start.elapsed().as_millis() as u64;

    let link = format!("/api/v1/events/{id}");
    Ok(ApiResponse::success(event, request_id, elapsed).with_link("self", &link))
}

/// DELETE /api/v1/events/:id - Delete an event.
pub async fn delete_event<B: Backend>(
    State(state): State<AppState<B>>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let id = parse_id(&id)?;
    state.backend.events().delete(id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(ApiResponse::success(
        serde_json::json!({ "deleted": id }),
        request_id,
        elapsed,
    ))
}
