//! Chat session CRUD handlers. Create and update are the widget ingest
//! path (public): the widget opens a transcript on first message and
//! keeps appending to it.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;

use leadbay_core::page::Page;
use leadbay_core::store::{Backend, ChatSessionStore};
use leadbay_types::chat::{ChatSession, CreateChatSession, UpdateChatSession};

use crate::http::error::AppError;
use crate::http::extractors::Authenticated;
use crate::http::query::ChatSessionListQuery;
use crate::http::response::ApiResponse;
use crate::state::AppState;

use super::parse_id;

/// POST /api/v1/chat-sessions - Open a transcript (public).
pub async fn create_chat_session<B: Backend>(
    State(state): State<AppState<B>>,
    Json(body): Json<CreateChatSession>,
) -> Result<ApiResponse<ChatSession>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let chat = state.backend.chats().create(body).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let link = format!("/api/v1/chat-sessions/{}", chat.id);
    Ok(ApiResponse::success(chat, request_id, elapsed).with_link("self", &link))
}

/// GET /api/v1/chat-sessions - List transcripts.
pub async fn list_chat_sessions<B: Backend>(
    State(state): State<AppState<B>>,
    _auth: Authenticated,
    Query(query): Query<ChatSessionListQuery>,
) -> Result<ApiResponse<Page<ChatSession>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let filter = query.into_filter()?;
    let page = state.backend.chats().list(&filter).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(ApiResponse::success(page, request_id, elapsed).with_link("self", "/api/v1/chat-sessions"))
}

/// GET /api/v1/chat-sessions/:id - Get one transcript.
pub async fn get_chat_session<B: Backend>(
    State(state): State<AppState<B>>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<ApiResponse<ChatSession>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let id = parse_id(&id)?;
    let chat = state
        .backend
        .chats()
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound("chat session"))?;
    let elapsed = start.elapsed().as_millis() as u64;

    let link = format!("/api/v1/chat-sessions/{id}");
    Ok(ApiResponse::success(chat, request_id, elapsed).with_link("self", &link))
}

/// PUT /api/v1/chat-sessions/:id - Update a transcript (public; the
/// widget appends messages as the visitor types).
pub async fn update_chat_session<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateChatSession>,
) -> Result<ApiResponse<ChatSession>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let id = parse_id(&id)?;
    let chat = state
        .backend
        .chats()
        .update(id, body)
        .await?
        .ok_or(AppError::NotFound("chat session"))?;
    let elapsed = start.elapsed().as_millis() as u64;

    let link = format!("/api/v1/chat-sessions/{id}");
    Ok(ApiResponse::success(chat, request_id, elapsed).with_link("self", &link))
}

/// DELETE /api/v1/chat-sessions/:id - Delete a transcript.
pub async fn delete_chat_session<B: Backend>(
    State(state): State<AppState<B>>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let id = parse_id(&id)?;
    state.backend.chats().delete(id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(ApiResponse::success(
        serde_json::json!({ "deleted": id }),
        request_id,
        elapsed,
    ))
}
