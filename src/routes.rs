use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn create_routes(state: &AppState) -> Router<AppState> {
    // Base64 inflates uploads by a third; leave room for the JSON envelope
    let body_limit = state.flows.limits.max_image_bytes / 3 * 4 + 64 * 1024;

    Router::new()
        // Health check
        .route("/api/health", get(health_check))

        // Capability actions
        .route("/api/translate", post(handlers::handle_translate))
        .route("/api/transliterate", post(handlers::handle_transliterate))
        .route("/api/vocabulary", post(handlers::handle_vocabulary))
        .route("/api/extract-text", post(handlers::handle_extract_text))
        .route("/api/extract-text/upload", post(handlers::handle_extract_upload))
        .layer(DefaultBodyLimit::max(body_limit))
}

/// Full application: routes, CORS for the browser UI, request tracing.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(create_routes(&state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "provider": state.flows.gateway.name(),
        "maxWords": state.config.system_config.max_words,
        "startedAt": state.started_at.to_rfc3339(),
        "uptimeSecs": (Utc::now() - state.started_at).num_seconds()
    }))
}
