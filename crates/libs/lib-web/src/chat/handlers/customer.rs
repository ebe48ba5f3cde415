//! # Customer Endpoint
//!
//! Protocol adapter for one session socket (`GET /ws/chat/{session_id}`).
//!
//! Customers, and agents viewing the same session, connect here. Each
//! inbound frame is decoded into a [`ClientEvent`], applied through the
//! [`SessionCoordinator`](crate::chat::SessionCoordinator), and the persisted
//! result is broadcast to the session's room. Broadcasting always happens
//! after the write it reports has completed, on the same task, so every
//! member sees a session's messages in transcript order.
//!
//! Error policy:
//!
//! - malformed frames, empty or oversized text: dropped, no reply
//! - privileged events without agent privilege: dropped
//! - closed or unknown session: dropped
//! - persistence failure: nothing is broadcast; the sending connection alone
//!   gets a transient system notice

use crate::chat::coordinator::Transition;
use crate::chat::handlers::utils::{chat_text, pump_socket, validate_session_id, ChatSocketQuery};
use crate::chat::protocol::{ClientEvent, ServerEvent};
use crate::chat::responder::{respond, BotReply};
use crate::chat::router::{ConnId, Group};
use crate::chat::state::ChatAppState;
use crate::middleware::{bearer_token, resolve_identity};
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use lib_auth::Identity;
use lib_core::model::store::FaqRepository;
use lib_core::{AppError, ChatMessage, SenderType, SessionStatus};
use lib_utils::{format_time, now_utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const BOT_APOLOGY: &str =
    "I'm sorry, I couldn't find an answer to that. Would you like to speak with a customer care agent?";

pub const DELIVERY_FAILED_NOTICE: &str =
    "Sorry, something went wrong and your last action could not be saved. Please try again.";

/// WebSocket handler for a chat session.
///
/// **Route**: `GET /ws/chat/{session_id}?token=...&name=...`
///
/// An invalid or missing token makes the connection an anonymous customer.
pub async fn customer_chat_websocket(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    Query(params): Query<ChatSocketQuery>,
    headers: HeaderMap,
    State(state): State<Arc<ChatAppState>>,
) -> Result<Response, AppError> {
    validate_session_id(&session_id)?;

    let identity = match bearer_token(&headers, params.token.as_deref()) {
        Some(token) => resolve_identity(&state.db, &state.config, token).await.ok(),
        None => None,
    };
    let customer_name = params.display_name();

    info!(
        session_id = %session_id,
        user = ?identity.as_ref().map(|id| id.username.as_str()),
        "[WS] CONNECT_ATTEMPT session_id={} path=/ws/chat",
        session_id
    );

    Ok(ws.on_upgrade(move |socket| handle_customer_socket(socket, state, session_id, identity, customer_name)))
}

async fn handle_customer_socket(
    socket: WebSocket,
    state: Arc<ChatAppState>,
    session_id: String,
    identity: Option<Identity>,
    customer_name: Option<String>,
) {
    let (outbound, outbound_rx) = mpsc::channel(state.outbound_buffer());

    let endpoint = match CustomerEndpoint::connect(state, session_id.clone(), identity, customer_name, outbound).await {
        Ok(endpoint) => endpoint,
        Err(e) => {
            error!(session_id = %session_id, error = %e, "[WS] CONNECT_FAILED session_id={} error={}", session_id, e);
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

/// One connection bound to one chat session.
pub struct CustomerEndpoint {
    state: Arc<ChatAppState>,
    session_id: String,
    room: Group,
    conn_id: ConnId,
    identity: Option<Identity>,
    outbound: mpsc::Sender<ServerEvent>,
}

impl CustomerEndpoint {
    /// Join the session's room and make sure the session exists.
    pub async fn connect(
        state: Arc<ChatAppState>,
        session_id: String,
        identity: Option<Identity>,
        customer_name: Option<String>,
        outbound: mpsc::Sender<ServerEvent>,
    ) -> Result<Self, AppError> {
        let conn_id = Uuid::new_v4();
        let room = Group::session(session_id.as_str());

        state.router.join(room.clone(), conn_id, outbound.clone()).await;

        let created = state
            .coordinator
            .get_or_create(&session_id, identity.as_ref(), customer_name.as_deref())
            .await;
        if let Err(e) = created {
            state.router.leave(&room, conn_id).await;
            return Err(e);
        }

        info!(session_id = %session_id, conn_id = %conn_id, "[WS] CONNECTED session_id={} conn_id={}", session_id, conn_id);

        Ok(Self {
            state,
            session_id,
            room,
            conn_id,
            identity,
            outbound,
        })
    }

    pub fn conn_id(&self) -> ConnId {
        self.conn_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Leave every group. Session state is left as is for reconnection.
    pub async fn disconnect(&self) {
        self.state.router.leave_all(self.conn_id).await;
        info!(session_id = %self.session_id, conn_id = %self.conn_id, "[WS] DISCONNECTED session_id={} conn_id={}", self.session_id, self.conn_id);
    }

    /// Decode and apply one text frame.
    pub async fn handle_text(&self, text: &str) {
        match ClientEvent::decode(text) {
            Some(event) => self.handle(event).await,
            None => debug!(session_id = %self.session_id, conn_id = %self.conn_id, "[WS] FRAME_IGNORED - undecodable frame"),
        }
    }

    pub async fn handle(&self, event: ClientEvent) {
        debug!(session_id = %self.session_id, conn_id = %self.conn_id, event = event.kind(), "[WS] EVENT");

        match event {
            ClientEvent::Message { message } => self.customer_message(&message).await,
            ClientEvent::AgentMessage { message } => self.agent_message(&message).await,
            ClientEvent::RequestAgent => self.request_agent().await,
            ClientEvent::AgentJoin => self.agent_join().await,
            ClientEvent::CloseChat => self.close_chat().await,
        }
    }

    // region: --- Events

    async fn customer_message(&self, raw: &str) {
        let Some(text) = chat_text(raw) else {
            debug!(session_id = %self.session_id, "[CHAT] MESSAGE_IGNORED - empty or too long");
            return;
        };

        let Some(message) = self.record(SenderType::Customer, text, self.identity.as_ref()).await else {
            return;
        };
        self.broadcast_message(&message, None, false).await;

        if self.bot_attending().await {
            self.bot_reply(text).await;
        }
    }

    async fn bot_attending(&self) -> bool {
        match self.state.coordinator.get(&self.session_id).await {
            Ok(session) => session.status == SessionStatus::Bot,
            Err(e) => {
                warn!(session_id = %self.session_id, error = %e, "[CHAT] STATUS_LOOKUP_FAILED");
                false
            }
        }
    }

    async fn bot_reply(&self, text: &str) {
        let delay = self.state.bot_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
            // a human may have taken over during the pause
            if !self.bot_attending().await {
                debug!(session_id = %self.session_id, "[CHAT] BOT_REPLY_DROPPED - session left bot mode");
                return;
            }
        }

        let faqs = match FaqRepository::list_active(&self.state.db).await {
            Ok(faqs) => faqs,
            Err(e) => {
                error!(session_id = %self.session_id, error = %e, "[CHAT] FAQ_LOAD_FAILED");
                self.notify_failure();
                return;
            }
        };

        match respond(text, &faqs, &self.state.responder) {
            BotReply::Escalate => {
                debug!(session_id = %self.session_id, "[CHAT] BOT_ESCALATE");
                self.request_agent().await;
            }
            BotReply::Text { text, offer_agent } => self.bot_say(&text, offer_agent).await,
            BotReply::NoAnswer => self.bot_say(BOT_APOLOGY, true).await,
        }
    }

    async fn bot_say(&self, text: &str, offer_agent: bool) {
        if let Some(message) = self.record(SenderType::Bot, text, None).await {
            self.broadcast_message(&message, None, offer_agent).await;
        }
    }

    async fn agent_message(&self, raw: &str) {
        let Some(agent) = self.attending_agent() else {
            debug!(session_id = %self.session_id, "[CHAT] AGENT_MESSAGE_DENIED - not an agent");
            return;
        };
        let Some(text) = chat_text(raw) else {
            debug!(session_id = %self.session_id, "[CHAT] MESSAGE_IGNORED - empty or too long");
            return;
        };

        if let Some(message) = self.record(SenderType::Agent, text, Some(agent)).await {
            self.broadcast_message(&message, Some(agent.username.clone()), false).await;
        }
    }

    async fn request_agent(&self) {
        match self.state.coordinator.request_agent(&self.session_id).await {
            Ok(Transition::Applied { notice, .. }) => {
                if let Some(notice) = notice {
                    self.broadcast_message(&notice, None, false).await;
                }
                let delivered = self
                    .state
                    .router
                    .broadcast(&Group::Agents, &ServerEvent::new_session(self.session_id.as_str()))
                    .await;
                info!(session_id = %self.session_id, agents = delivered, "[AGENT] NEW_SESSION_NOTIFIED");
            }
            Ok(Transition::Ignored) => {}
            Err(e) => self.transition_failed("request_agent", e),
        }
    }

    async fn agent_join(&self) {
        let Some(agent) = self.attending_agent() else {
            debug!(session_id = %self.session_id, "[CHAT] AGENT_JOIN_DENIED - not an agent");
            return;
        };

        match self.state.coordinator.join_agent(&self.session_id, agent).await {
            Ok(Transition::Applied { notice, .. }) => {
                self.state.router.join(self.room.clone(), self.conn_id, self.outbound.clone()).await;
                if let Some(notice) = notice {
                    self.broadcast_message(&notice, None, false).await;
                }
            }
            Ok(Transition::Ignored) => {
                debug!(session_id = %self.session_id, agent = %agent.username, "[CHAT] AGENT_JOIN_IGNORED");
            }
            Err(e) => self.transition_failed("agent_join", e),
        }
    }

    async fn close_chat(&self) {
        match self.state.coordinator.close(&self.session_id).await {
            Ok(Transition::Applied { session, .. }) => {
                let ended_at = session.ended_at.unwrap_or_else(now_utc);
                let event = ServerEvent::Closed { timestamp: format_time(ended_at) };
                self.state.router.broadcast(&self.room, &event).await;
            }
            Ok(Transition::Ignored) => {}
            Err(e) => self.transition_failed("close_chat", e),
        }
    }

    // endregion: --- Events

    fn attending_agent(&self) -> Option<&Identity> {
        self.identity.as_ref().filter(|id| id.can_attend())
    }

    async fn record(&self, sender: SenderType, text: &str, author: Option<&Identity>) -> Option<ChatMessage> {
        match self.state.coordinator.record(&self.session_id, sender, text, author).await {
            Ok(message) => Some(message),
            Err(AppError::SessionClosed(_)) => {
                debug!(session_id = %self.session_id, sender = %sender, "[CHAT] RECORD_REJECTED - session closed");
                None
            }
            Err(AppError::NotFound(_)) => {
                warn!(session_id = %self.session_id, sender = %sender, "[CHAT] RECORD_REJECTED - session missing");
                None
            }
            Err(e) => {
                error!(session_id = %self.session_id, sender = %sender, error = %e, "[CHAT] RECORD_FAILED");
                self.notify_failure();
                None
            }
        }
    }

    fn transition_failed(&self, action: &str, err: AppError) {
        match err {
            AppError::SessionClosed(_) | AppError::NotFound(_) => {
                debug!(session_id = %self.session_id, action, error = %err, "[CHAT] TRANSITION_REJECTED");
            }
            _ => {
                error!(session_id = %self.session_id, action, error = %err, "[CHAT] TRANSITION_FAILED");
                self.notify_failure();
            }
        }
    }

    async fn broadcast_message(&self, message: &ChatMessage, sender_name: Option<String>, show_agent_button: bool) {
        let event = ServerEvent::from_message(message, sender_name, show_agent_button);
        self.state.router.broadcast(&self.room, &event).await;
    }

    // Ephemeral, to this connection only.
    fn notify_failure(&self) {
        if self.outbound.try_send(ServerEvent::notice(DELIVERY_FAILED_NOTICE)).is_err() {
            debug!(conn_id = %self.conn_id, "[WS] NOTICE_DROPPED");
        }
    }
}
