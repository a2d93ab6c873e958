//! Axum route handlers for the relay HTTP server.
//!
//! # Routes
//!
//! - `GET  /`    : Returns `{"message": "Soft Skills MVP backend is running!"}`
//! - `POST /chat`: Accepts `ChatRequest`, returns `{"reply": ...}` or `{"evaluation": ...}`

use std::sync::Arc;

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::chat::{ChatOrchestrator, ChatRequest, ChatResponse};

/// Body of the health check.
pub const HEALTH_MESSAGE: &str = "Soft Skills MVP backend is running!";

/// Shared application state for the HTTP server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Stateless turn handler, shared by every request.
    pub orchestrator: Arc<ChatOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: ChatOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

/// Build the axum router with all routes.
///
/// CORS is wide open: any origin, method and header.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/chat", post(chat_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /: liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "message": HEALTH_MESSAGE }))
}

/// POST /chat: run one chat turn.
///
/// Always answers 200 once the body has been decoded; failures are reported
/// inside the `reply` field.
async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let response = state.orchestrator.handle_chat_turn(&request).await;
    tracing::debug!(evaluation = response.is_evaluation(), "chat turn complete");
    Json(response)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
