//! Dashboard authentication: login mints a session token, logout
//! deletes it, `me` echoes the authenticated user.

use std::time::Instant;

use axum::extract::State;
use axum::http::request::Parts;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use leadbay_core::store::{Backend, SessionStore, UserStore};
use leadbay_types::user::User;

use crate::http::error::AppError;
use crate::http::extractors::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::{AppState, SESSION_TTL_SECS};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/v1/auth/login - Verify credentials and mint a session.
pub async fn login<B: Backend>(
    State(state): State<AppState<B>>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let user = state
        .backend
        .users()
        .verify_credentials(&body.username, &body.password)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid username or password".to_string()))?;

    let session = state
        .backend
        .sessions()
        .create(user.id, SESSION_TTL_SECS)
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    tracing::info!(user = %user.username, "login");
    Ok(ApiResponse::success(
        json!({
            "token": session.token,
            "expires_at": session.expires_at,
            "user": user,
        }),
        request_id,
        elapsed,
    )
    .with_link("me", "/api/v1/auth/me"))
}

/// POST /api/v1/auth/logout - Delete the presented session. Idempotent.
pub async fn logout<B: Backend>(
    State(state): State<AppState<B>>,
    parts: Parts,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    if let Some(token) = bearer_token(&parts) {
        state.backend.sessions().delete_by_token(&token).await?;
    }
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(ApiResponse::success(
        json!({ "logged_out": true }),
        request_id,
        elapsed,
    ))
}

/// GET /api/v1/auth/me - The authenticated user.
pub async fn me<B: Backend>(
    State(_state): State<AppState<B>>,
    Authenticated(user): Authenticated,
) -> Result<ApiResponse<User>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(user, request_id, elapsed).with_link("self", "/api/v1/auth/me"))
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
