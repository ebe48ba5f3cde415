//! # Chat HTTP Handlers
//!
//! REST side of the support chat.
//!
//! ## Endpoints
//!
//! - `POST /api/chat/sessions` - Issue a fresh session token
//! - `GET /api/chat/history/{session_id}` - Full transcript
//! - `POST /api/chat/history/{session_id}/read` - Mark customer messages read (agent)
//! - `GET /api/agent/dashboard` - Waiting and active sessions (agent)

use crate::chat::handlers::utils::validate_session_id;
use crate::chat::state::ChatAppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use lib_auth::Identity;
use lib_core::dto::{DashboardResponse, HistoryResponse, MarkReadResponse, NewSessionResponse, SessionSummary};
use lib_core::model::store::{ChatMessageRepository, ChatSessionRepository};
use lib_core::{AppError, SenderType, SessionStatus};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Issue a new session token. The session itself is created on first connect.
pub async fn create_session() -> (StatusCode, Json<NewSessionResponse>) {
    let session_id = Uuid::new_v4().to_string();
    info!(session_id = %session_id, "[CHAT] SESSION_TOKEN_ISSUED");
    (StatusCode::CREATED, Json(NewSessionResponse { session_id }))
}

/// Transcript of a session in recording order.
///
/// Unknown sessions answer `404 {"success": false, "error": "Session not found"}`.
#[instrument(skip(state))]
pub async fn get_chat_history(
    State(state): State<Arc<ChatAppState>>,
    Path(session_id): Path<String>,
) -> Result<Response, AppError> {
    validate_session_id(&session_id)?;

    let Some(session) = ChatSessionRepository::find(&state.db, &session_id).await? else {
        return Ok(session_not_found());
    };
    let transcript = state.coordinator.transcript(&session_id).await?;

    Ok(Json(HistoryResponse::new(session.status, transcript)).into_response())
}

/// Mark every unread customer message of the session as read.
#[instrument(skip(state, identity), fields(agent = %identity.username))]
pub async fn mark_history_read(
    State(state): State<Arc<ChatAppState>>,
    Extension(identity): Extension<Identity>,
    Path(session_id): Path<String>,
) -> Result<Response, AppError> {
    require_staff(&identity)?;
    validate_session_id(&session_id)?;

    if ChatSessionRepository::find(&state.db, &session_id).await?.is_none() {
        return Ok(session_not_found());
    }
    let updated = ChatMessageRepository::mark_read(&state.db, &session_id, SenderType::Customer).await?;

    Ok(Json(MarkReadResponse { success: true, updated }).into_response())
}

/// Sessions for the agent dashboard page.
#[instrument(skip(state, identity), fields(agent = %identity.username))]
pub async fn agent_dashboard(
    State(state): State<Arc<ChatAppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<DashboardResponse>, AppError> {
    require_staff(&identity)?;

    let waiting = ChatSessionRepository::list_by_status(&state.db, SessionStatus::Waiting).await?;
    let my_active = ChatSessionRepository::list_active_for_agent(&state.db, identity.user_id).await?;
    let all_active = ChatSessionRepository::list_by_status(&state.db, SessionStatus::Active).await?;

    Ok(Json(DashboardResponse {
        waiting: waiting.into_iter().map(SessionSummary::from).collect(),
        my_active: my_active.into_iter().map(SessionSummary::from).collect(),
        all_active: all_active.into_iter().map(SessionSummary::from).collect(),
    }))
}

fn require_staff(identity: &Identity) -> Result<(), AppError> {
    if identity.can_attend() {
        return Ok(());
    }
    warn!(user = %identity.username, role = %identity.role, "[AUTH] Agent route denied");
    Err(AppError::Forbidden("Agent privileges required".to_string()))
}

fn session_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": "Session not found" })),
    )
        .into_response()
}
