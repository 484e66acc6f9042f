//! Axum router configuration with middleware.
//!
//! All routes live under `/api/v1/`. Widget ingest (lead create, chat
//! session create/update, event create, widget-config fetch) is public;
//! dashboard reads and mutations authenticate per handler through the
//! session extractor. Middleware: permissive CORS (the widget is
//! embedded on arbitrary microsites) and request tracing.

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use leadbay_core::store::Backend;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router for the chosen backend.
pub fn build_router<B: Backend>(state: AppState<B>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Leads
        .route("/leads", post(handlers::lead::create_lead::<B>))
        .route("/leads", get(handlers::lead::list_leads::<B>))
        .route("/leads/{id}", get(handlers::lead::get_lead::<B>))
        .route("/leads/{id}", put(handlers::lead::update_lead::<B>))
        .route("/leads/{id}", delete(handlers::lead::delete_lead::<B>))
        // Chat sessions
        .route(
            "/chat-sessions",
            post(handlers::chat::create_chat_session::<B>),
        )
        .route(
            "/chat-sessions",
            get(handlers::chat::list_chat_sessions::<B>),
        )
        .route(
            "/chat-sessions/{id}",
            get(handlers::chat::get_chat_session::<B>),
        )
        .route(
            "/chat-sessions/{id}",
            put(handlers::chat::update_chat_session::<B>),
        )
        .route(
            "/chat-sessions/{id}",
            delete(handlers::chat::delete_chat_session::<B>),
        )
        // Events
        .route("/events", post(handlers::event::create_event::<B>))
        .route("/events", get(handlers::event::list_events::<B>))
        .route("/events/{id}", get(handlers::event::get_event::<B>))
        .route("/events/{id}", delete(handlers::event::delete_event::<B>))
        // Widget config
        .route(
            "/widget-config/{project_id}",
            get(handlers::widget::get_widget_config::<B>),
        )
        .route(
            "/widget-config/{project_id}",
            put(handlers::widget::put_widget_config::<B>),
        )
        // Auth
        .route("/auth/login", post(handlers::auth::login::<B>))
        .route("/auth/logout", post(handlers::auth::logout::<B>))
        .route("/auth/me", get(handlers::auth::me::<B>));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness probe, no auth.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
