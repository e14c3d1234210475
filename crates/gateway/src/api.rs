//! HTTP API handlers.
//!
//! Endpoints:
//!
//! - `POST   /api/chat`                       - Process one message, get the reply
//! - `GET    /api/sessions`                   - List persisted sessions
//! - `GET    /api/sessions/{id}/history`      - Session log (`?limit=N` for the tail)
//! - `GET    /api/sessions/{id}/stats`        - Entry count and timestamps
//! - `DELETE /api/sessions/{id}/history`      - Clear a session's log

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use skimmer_agent::{InboundMessage, TurnOrchestrator, TurnReply};
use skimmer_core::conversation::{ConversationEntry, SessionStats};
use skimmer_core::error::{Error, StorageError};
use std::sync::Arc;
use tracing::{error, info};

/// Shared state for the API.
pub struct ApiState {
    pub orchestrator: Arc<TurnOrchestrator>,
}

pub type SharedApiState = Arc<ApiState>;

pub fn api_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/sessions", get(list_sessions_handler))
        .route(
            "/sessions/{id}/history",
            get(history_handler).delete(clear_handler),
        )
        .route("/sessions/{id}/stats", get(stats_handler))
        .with_state(state)
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub session_id: String,
    pub entries: Vec<ConversationEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub session_id: String,
    #[serde(flatten)]
    pub stats: SessionStats,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub session_id: String,
    pub cleared: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<String>,
}

fn error_response(e: &Error) -> ApiError {
    let status = if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

fn storage_error(session_id: &str, e: StorageError) -> ApiError {
    error!(session_id, error = %e, "Session storage failed");
    error_response(&Error::Storage(e))
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn chat_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<InboundMessage>,
) -> Result<Json<TurnReply>, ApiError> {
    state
        .orchestrator
        .handle(payload)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

async fn history_handler(
    State(state): State<SharedApiState>,
    Path(session_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let store = state.orchestrator.store();
    let entries = match query.limit {
        Some(limit) => store.recent(&session_id, limit).await,
        None => store.history(&session_id).await,
    }
    .map_err(|e| storage_error(&session_id, e))?;

    Ok(Json(HistoryResponse {
        session_id,
        entries,
    }))
}

async fn stats_handler(
    State(state): State<SharedApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state
        .orchestrator
        .store()
        .stats(&session_id)
        .await
        .map_err(|e| storage_error(&session_id, e))?;

    Ok(Json(StatsResponse { session_id, stats }))
}

async fn clear_handler(
    State(state): State<SharedApiState>,
    Path(session_id): Path<String>,
) -> Result<Json<ClearResponse>, ApiError> {
    state
        .orchestrator
        .store()
        .clear(&session_id)
        .await
        .map_err(|e| storage_error(&session_id, e))?;

    info!(session_id = %session_id, "Session cleared via API");
    Ok(Json(ClearResponse {
        session_id,
        cleared: true,
    }))
}

async fn list_sessions_handler(
    State(state): State<SharedApiState>,
) -> Result<Json<SessionListResponse>, ApiError> {
    let sessions = state
        .orchestrator
        .store()
        .sessions()
        .await
        .map_err(|e| storage_error("*", e))?;

    Ok(Json(SessionListResponse { sessions }))
}
