//! # Agent Dashboard Endpoint
//!
//! Monitoring socket for agents (`GET /ws/agent-dashboard`).
//!
//! Agents join the shared agents group, receive the waiting-sessions
//! snapshot on connect, a `new_session` notification whenever a customer
//! asks for a human, and a fresh snapshot on `get_waiting_sessions`.

use crate::chat::handlers::utils::{pump_socket, ChatSocketQuery};
use crate::chat::protocol::{AgentClientEvent, ServerEvent, WaitingSession};
use crate::chat::router::{ConnId, Group};
use crate::chat::state::ChatAppState;
use crate::middleware::{bearer_token, resolve_identity};
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use lib_auth::Identity;
use lib_core::AppError;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// WebSocket handler for the agent dashboard.
///
/// **Route**: `GET /ws/agent-dashboard?token=...`
///
/// Rejected before upgrade with `401` without a valid token and `403` for
/// accounts that cannot attend sessions.
pub async fn agent_dashboard_websocket(
    ws: WebSocketUpgrade,
    Query(params): Query<ChatSocketQuery>,
    headers: HeaderMap,
    State(state): State<Arc<ChatAppState>>,
) -> Result<Response, AppError> {
    let token = bearer_token(&headers, params.token.as_deref())
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;
    let identity = resolve_identity(&state.db, &state.config, token).await?;
    ensure_agent(&identity)?;

    info!(agent = %identity.username, "[WS] CONNECT_ATTEMPT path=/ws/agent-dashboard agent={}", identity.username);

    Ok(ws.on_upgrade(move |socket| handle_agent_socket(socket, state, identity)))
}

async fn handle_agent_socket(socket: WebSocket, state: Arc<ChatAppState>, identity: Identity) {
    let (outbound, outbound_rx) = mpsc::channel(state.outbound_buffer());
    let username = identity.username.clone();

    let endpoint = match AgentEndpoint::connect(state, identity, outbound).await {
        Ok(endpoint) => endpoint,
        Err(e) => {
            error!(agent = %username, error = %e, "[WS] CONNECT_FAILED agent={} error={}", username, e);
            return;
        }
    };

    let ep = &endpoint;
    let writer = pump_socket(socket, outbound_rx, endpoint.conn_id(), move |text| async move {
        ep.handle_text(&text).await
    })
    .await;

    endpoint.disconnect().await;
    writer.abort();
}

fn ensure_agent(identity: &Identity) -> Result<(), AppError> {
    if identity.can_attend() {
        Ok(())
    } else {
        warn!(user = %identity.username, role = %identity.role, "[AUTH] Agent dashboard denied");
        Err(AppError::Forbidden("Agent privileges required".to_string()))
    }
}

/// One agent's monitoring connection.
pub struct AgentEndpoint {
    state: Arc<ChatAppState>,
    identity: Identity,
    conn_id: ConnId,
    outbound: mpsc::Sender<ServerEvent>,
}

impl AgentEndpoint {
    /// Join the agents group and send the current waiting-sessions snapshot.
    ///
    /// # Errors
    ///
    /// [`AppError::Forbidden`] when `identity` cannot attend sessions.
    pub async fn connect(
        state: Arc<ChatAppState>,
        identity: Identity,
        outbound: mpsc::Sender<ServerEvent>,
    ) -> Result<Self, AppError> {
        ensure_agent(&identity)?;

        let conn_id = Uuid::new_v4();
        state.router.join(Group::Agents, conn_id, outbound.clone()).await;

        let endpoint = Self {
            state,
            identity,
            conn_id,
            outbound,
        };
        info!(agent = %endpoint.identity.username, conn_id = %conn_id, "[WS] AGENT_CONNECTED agent={}", endpoint.identity.username);

        endpoint.send_waiting_sessions().await;
        Ok(endpoint)
    }

    pub fn conn_id(&self) -> ConnId {
        self.conn_id
    }

    pub async fn disconnect(&self) {
        self.state.router.leave_all(self.conn_id).await;
        info!(agent = %self.identity.username, conn_id = %self.conn_id, "[WS] AGENT_DISCONNECTED agent={}", self.identity.username);
    }

    pub async fn handle_text(&self, text: &str) {
        match AgentClientEvent::decode(text) {
            Some(AgentClientEvent::GetWaitingSessions) => self.send_waiting_sessions().await,
            None => debug!(conn_id = %self.conn_id, "[WS] FRAME_IGNORED - undecodable agent frame"),
        }
    }

    /// Send the waiting-sessions snapshot to this connection only.
    pub async fn send_waiting_sessions(&self) {
        let sessions = match self.state.coordinator.waiting_sessions().await {
            Ok(sessions) => sessions,
            Err(e) => {
                error!(agent = %self.identity.username, error = %e, "[AGENT] WAITING_SESSIONS_FAILED");
                return;
            }
        };

        let event = ServerEvent::WaitingSessions {
            sessions: sessions.into_iter().map(WaitingSession::from).collect(),
        };
        if self.outbound.send(event).await.is_err() {
            debug!(conn_id = %self.conn_id, "[WS] SNAPSHOT_DROPPED - connection gone");
        }
    }
}
