//! Lead CRUD handlers.
//!
//! Creation is the widget ingest path and is public; everything else is
//! dashboard-facing and requires a session token.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;

use leadbay_core::page::Page;
use leadbay_core::store::{Backend, LeadStore};
use leadbay_types::lead::{CreateLead, Lead, UpdateLead};

use crate::http::error::AppError;
use crate::http::extractors::Authenticated;
use crate::http::query::LeadListQuery;
use crate::http::response::ApiResponse;
use crate::state::AppState;

use super::parse_id;

/// POST /api/v1/leads - Capture a lead from a widget (public).
pub async fn create_lead<B: Backend>(
    State(state): State<AppState<B>>,
    Json(body): Json<CreateLead>,
) -> Result<ApiResponse<Lead>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let lead = state.backend.leads().create(body).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let link = format!("/api/v1/leads/{}", lead.id);
    Ok(ApiResponse::success(lead, request_id, elapsed).with_link("self", &link))
}

/// GET /api/v1/leads - List leads with filtering and pagination.
pub async fn list_leads<B: Backend>(
    State(state): State<AppState<B>>,
    _auth: Authenticated,
    Query(query): Query<LeadListQuery>,
) -> Result<ApiResponse<Page<Lead>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let filter = query.into_filter()?;
    let page = state.backend.leads().list(&filter).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(ApiResponse::success(page, request_id, elapsed).with_link("self", "/api/v1/leads"))
}

/// GET /api/v1/leads/:id - Get one lead.
pub async fn get_lead<B: Backend>(
    State(state): State<AppState<B>>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<ApiResponse<Lead>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let id = parse_id(&id)?;
    let lead = state
        .backend
        .leads()
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound("lead"))?;
    let elapsed = start.elapsed().as_millis() as u64;

    let link = format!("/api/v1/leads/{id}");
    Ok(ApiResponse::success(lead, request_id, elapsed)
        .with_link("self", &link)
        .with_link("chat_sessions", &format!("/api/v1/chat-sessions?lead_id={id}")))
}

/// PUT /api/v1/leads/:id - Partially update a lead.
pub async fn update_lead<B: Backend>(
    State(state): State<AppState<B>>,
    _auth: Authenticated,
    Path(id): Path<String>,
    Json(body): Json<UpdateLead>,
) -> Result<ApiResponse<Lead>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let id = parse_id(&id)?;
    let lead = state
        .backend
        .leads()
        .update(id, body)
        .await?
        .ok_or(AppError::NotFound("lead"))?;
    let elapsed = start.elapsed().as_millis() as u64;

    let link = format!("/api/v1/leads/{id}");
    Ok(ApiResponse::success(lead, request_id, elapsed).with_link("self", &link))
}

/// DELETE /api/v1/leads/:id - Delete a lead. Succeeds for absent ids.
pub async fn delete_lead<B: Backend>(
    State(state): State<AppState<B>>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let id = parse_id(&id)?;
    state.backend.leads().delete(id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(ApiResponse::success(
        serde_json::json!({ "deleted": id }),
        request_id,
        elapsed,
    ))
}
