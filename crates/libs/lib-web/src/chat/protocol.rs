//! # Chat Wire Protocol
//!
//! JSON frames exchanged over the chat WebSockets, as closed tagged unions.
//!
//! ## Customer socket (`/ws/chat/{session_id}`)
//!
//! ```json
//! { "type": "message", "message": "Where is my parcel?" }
//! { "type": "agent_message", "message": "Let me check." }
//! { "type": "request_agent" }
//! { "type": "agent_join" }
//! { "type": "close_chat" }
//! ```
//!
//! A frame without `type` is a `message`. Anything that fails to decode is
//! dropped by the endpoint without a reply.
//!
//! ## Agent monitoring socket (`/ws/agent-dashboard`)
//!
//! ```json
//! { "type": "get_waiting_sessions" }
//! ```
//!
//! ## Server frames
//!
//! ```json
//! { "type": "message", "message": "...", "sender": "bot", "timestamp": "2025-01-01T10:00:00.000000Z", "show_agent_button": false }
//! { "type": "closed", "timestamp": "..." }
//! { "type": "agent_notification", "action": "new_session", "session_id": "..." }
//! { "type": "waiting_sessions", "sessions": [ { "session_id": "...", "started_at": "..." } ] }
//! ```

use lib_core::{ChatMessage, SenderType, SessionOverview};
use lib_utils::format_time;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Notification action for a session that just started waiting for an agent.
pub const NEW_SESSION_ACTION: &str = "new_session";

// region: --- Inbound

/// Frames sent by a customer (or an agent viewing a session) to the session socket.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    Message {
        #[serde(default)]
        message: String,
    },
    AgentMessage {
        #[serde(default)]
        message: String,
    },
    RequestAgent,
    AgentJoin,
    CloseChat,
}

impl ClientEvent {
    /// Decode a text frame. Returns `None` for malformed JSON or unknown types.
    pub fn decode(text: &str) -> Option<Self> {
        let mut value: Value = serde_json::from_str(text).ok()?;
        let frame = value.as_object_mut()?;
        if !frame.contains_key("type") {
            frame.insert("type".to_string(), Value::from("message"));
        }
        serde_json::from_value(value).ok()
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientEvent::Message { .. } => "message",
            ClientEvent::AgentMessage { .. } => "agent_message",
            ClientEvent::RequestAgent => "request_agent",
            ClientEvent::AgentJoin => "agent_join",
            ClientEvent::CloseChat => "close_chat",
        }
    }
}

/// Frames sent by an agent monitoring connection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentClientEvent {
    GetWaitingSessions,
}

impl AgentClientEvent {
    pub fn decode(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}

// endregion: --- Inbound

// region: --- Outbound

/// Entry of the waiting-sessions snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitingSession {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    pub started_at: String,
}

impl From<SessionOverview> for WaitingSession {
    fn from(overview: SessionOverview) -> Self {
        Self {
            session_id: overview.session_id,
            customer_username: overview.customer_username,
            customer_name: overview.customer_name,
            started_at: format_time(overview.started_at),
        }
    }
}

/// Frames delivered to connections through the channel router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Message {
        message: String,
        sender: SenderType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_name: Option<String>,
        timestamp: String,
        #[serde(default)]
        show_agent_button: bool,
    },
    Closed {
        timestamp: String,
    },
    AgentNotification {
        action: String,
        session_id: String,
    },
    WaitingSessions {
        sessions: Vec<WaitingSession>,
    },
}

impl ServerEvent {
    /// Room frame for a persisted transcript entry.
    pub fn from_message(message: &ChatMessage, sender_name: Option<String>, show_agent_button: bool) -> Self {
        ServerEvent::Message {
            message: message.message.clone(),
            sender: message.sender_type,
            sender_name,
            timestamp: format_time(message.timestamp),
            show_agent_button,
        }
    }

    /// Transient system notice that was never persisted.
    pub fn notice(text: impl Into<String>) -> Self {
        ServerEvent::Message {
            message: text.into(),
            sender: SenderType::System,
            sender_name: None,
            timestamp: format_time(lib_utils::now_utc()),
            show_agent_button: false,
        }
    }

    pub fn new_session(session_id: impl Into<String>) -> Self {
        ServerEvent::AgentNotification {
            action: NEW_SESSION_ACTION.to_string(),
            session_id: session_id.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::Message { .. } => "message",
            ServerEvent::Closed { .. } => "closed",
            ServerEvent::AgentNotification { .. } => "agent_notification",
            ServerEvent::WaitingSessions { .. } => "waiting_sessions",
        }
    }
}

// endregion: --- Outbound
