//! Widget configuration handlers. The widget fetches its display config
//! anonymously; writes come from the dashboard.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;

use leadbay_core::store::{Backend, WidgetConfigStore};
use leadbay_types::widget::{UpsertWidgetConfig, WidgetConfig};

use crate::http::error::AppError;
use crate::http::extractors::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/widget-config/:project_id - Fetch display config (public).
pub async fn get_widget_config<B: Backend>(
    State(state): State<AppState<B>>,
    Path(project_id): Path<String>,
) -> Result<ApiResponse<WidgetConfig>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let config = state
        .backend
        .widgets()
        .get_by_project(&project_id)
        .await?
        .ok_or(AppError::NotFound("widget config"))?;
    let elapsed = start.elapsed().as_millis() as u64;

    let link = format!("/api/v1/widget-config/{project_id}");
    Ok(ApiResponse::success(config, request_id, elapsed).with_link("self", &link))
}

/// PUT /api/v1/widget-config/:project_id - Create or update the config.
pub async fn put_widget_config<B: Backend>(
    State(state): State<AppState<B>>,
    _auth: Authenticated,
    Path(project_id): Path<String>,
    Json(body): Json<UpsertWidgetConfig>,
) -> Result<ApiResponse<WidgetConfig>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let config = state.backend.widgets().upsert(&project_id, body).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let link = format!("/api/v1/widget-config/{project_id}");
    Ok(ApiResponse::success(config, request_id, elapsed).with_link("self", &link))
}
