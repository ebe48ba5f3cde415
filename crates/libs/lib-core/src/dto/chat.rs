//! # Support Chat Data Transfer Objects
//!
//! Request and response structures for the HTTP side of the support chat.
//! The WebSocket frames live with the chat endpoints in `lib-web`.
//!
//! ## Endpoints Using These DTOs
//!
//! - `POST /api/chat/sessions` -> [`NewSessionResponse`]
//! - `GET /api/chat/history/{session_id}` -> [`HistoryResponse`]
//! - `POST /api/chat/history/{session_id}/read` -> [`MarkReadResponse`]
//! - `GET /api/agent/dashboard` -> [`DashboardResponse`]
//! - `GET /api/faqs?category=tracking&search=label` - [`FaqQuery`] (query) -> `Vec<`[`FaqDto`]`>`
//!
//! ## Wire Format
//!
//! All DTOs use **snake_case** field names. Timestamps are RFC 3339 strings in UTC.
//!
//! ## Example History Response
//!
//! ```json
//! {
//!   "success": true,
//!   "status": "active",
//!   "messages": [
//!     {
//!       "sender_type": "customer",
//!       "message": "Where is my parcel?",
//!       "timestamp": "2025-01-01T10:00:00.000000Z",
//!       "sender_username": null
//!     },
//!     {
//!       "sender_type": "agent",
//!       "message": "Let me check that for you.",
//!       "timestamp": "2025-01-01T10:01:12.000000Z",
//!       "sender_username": "dana"
//!     }
//!   ]
//! }
//! ```

use crate::model::store::models::{
    Faq, FaqCategory, SenderType, SessionOverview, SessionStatus, TranscriptEntry,
};
use lib_utils::format_time;
use serde::{Deserialize, Serialize};

/// Fresh session token for a chat widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSessionResponse {
    pub session_id: String,
}

// region: --- History

/// One transcript line as shown to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryMessage {
    pub sender_type: SenderType,
    pub message: String,
    pub timestamp: String,
    pub sender_username: Option<String>,
}

impl From<TranscriptEntry> for HistoryMessage {
    fn from(entry: TranscriptEntry) -> Self {
        Self {
            sender_type: entry.sender_type,
            message: entry.message,
            timestamp: format_time(entry.timestamp),
            sender_username: entry.sender_username,
        }
    }
}

/// Full transcript of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub status: SessionStatus,
    pub messages: Vec<HistoryMessage>,
}

impl HistoryResponse {
    pub fn new(status: SessionStatus, transcript: Vec<TranscriptEntry>) -> Self {
        Self {
            success: true,
            status,
            messages: transcript.into_iter().map(HistoryMessage::from).collect(),
        }
    }
}

/// Result of marking a session's customer messages as read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub success: bool,
    pub updated: u64,
}

// endregion: --- History

// region: --- Agent dashboard

/// Session row on the agent dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub session_id: String,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_username: Option<String>,
    pub started_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_joined_at: Option<String>,
}

impl From<SessionOverview> for SessionSummary {
    fn from(overview: SessionOverview) -> Self {
        Self {
            session_id: overview.session_id,
            status: overview.status,
            customer_username: overview.customer_username,
            customer_name: overview.customer_name,
            agent_username: overview.agent_username,
            started_at: format_time(overview.started_at),
            agent_joined_at: overview.agent_joined_at.map(format_time),
        }
    }
}

/// Everything an agent needs on first load of the dashboard page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    /// Sessions waiting for an agent, oldest first
    pub waiting: Vec<SessionSummary>,
    /// Active sessions attended by the requesting agent
    pub my_active: Vec<SessionSummary>,
    /// All active sessions
    pub all_active: Vec<SessionSummary>,
}

// endregion: --- Agent dashboard

// region: --- FAQs

/// Query parameters for `GET /api/faqs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FaqQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl FaqQuery {
    /// Parsed category filter. Blank means no filter.
    pub fn category(&self) -> Result<Option<FaqCategory>, String> {
        match self.category.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }
}

/// Public view of a knowledge-base entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqDto {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub keywords: Vec<String>,
    pub category: FaqCategory,
}

impl From<Faq> for FaqDto {
    fn from(faq: Faq) -> Self {
        Self {
            keywords: faq.keywords_list(),
            id: faq.id,
            question: faq.question,
            answer: faq.answer,
            category: faq.category,
        }
    }
}

// endregion: --- FAQs
