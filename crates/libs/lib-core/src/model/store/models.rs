use chrono::{DateTime, Utc};
use lib_auth::Role;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User entity: just enough of an account to reference from chats.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

// region: --- Chat sessions

/// Lifecycle of a chat session.
///
/// `Bot` → `Waiting` → `Active`, and any state → `Closed`. `Closed` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Bot,
    Waiting,
    Active,
    Closed,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Bot => "bot",
            SessionStatus::Waiting => "waiting",
            SessionStatus::Active => "active",
            SessionStatus::Closed => "closed",
        }
    }

    pub fn is_closed(self) -> bool {
        self == SessionStatus::Closed
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bot" => Ok(SessionStatus::Bot),
            "waiting" => Ok(SessionStatus::Waiting),
            "active" => Ok(SessionStatus::Active),
            "closed" => Ok(SessionStatus::Closed),
            _ => Err(format!("Invalid session status: {}", s)),
        }
    }
}

impl TryFrom<String> for SessionStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A support conversation, keyed by its opaque session token.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatSession {
    pub id: i64,
    /// Opaque session token shared with the chat widget
    pub session_id: String,
    pub customer_id: Option<i64>,
    /// Display name for anonymous customers
    pub customer_name: Option<String>,
    pub agent_id: Option<i64>,
    #[sqlx(try_from = "String")]
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub agent_joined_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// Session row joined with customer and agent usernames, for dashboards.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionOverview {
    pub session_id: String,
    #[sqlx(try_from = "String")]
    pub status: SessionStatus,
    pub customer_username: Option<String>,
    pub customer_name: Option<String>,
    pub agent_username: Option<String>,
    pub started_at: DateTime<Utc>,
    pub agent_joined_at: Option<DateTime<Utc>>,
}

// endregion: --- Chat sessions

// region: --- Chat messages

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    Customer,
    Bot,
    Agent,
    System,
}

impl SenderType {
    pub fn as_str(self) -> &'static str {
        match self {
            SenderType::Customer => "customer",
            SenderType::Bot => "bot",
            SenderType::Agent => "agent",
            SenderType::System => "system",
        }
    }
}

impl std::fmt::Display for SenderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SenderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(SenderType::Customer),
            "bot" => Ok(SenderType::Bot),
            "agent" => Ok(SenderType::Agent),
            "system" => Ok(SenderType::System),
            _ => Err(format!("Invalid sender type: {}", s)),
        }
    }
}

impl TryFrom<String> for SenderType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One persisted transcript entry. Immutable apart from `is_read`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatMessage {
    pub id: i64,
    pub chat_session_id: i64,
    #[sqlx(try_from = "String")]
    pub sender_type: SenderType,
    pub sender_id: Option<i64>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

/// Transcript entry joined with the sender's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TranscriptEntry {
    pub id: i64,
    #[sqlx(try_from = "String")]
    pub sender_type: SenderType,
    pub sender_id: Option<i64>,
    pub sender_username: Option<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

// endregion: --- Chat messages

// region: --- Knowledge base

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FaqCategory {
    Shipping,
    Tracking,
    Delivery,
    Refund,
    Pickup,
    Pricing,
    Account,
    General,
}

impl FaqCategory {
    pub const ALL: [FaqCategory; 8] = [
        FaqCategory::Shipping,
        FaqCategory::Tracking,
        FaqCategory::Delivery,
        FaqCategory::Refund,
        FaqCategory::Pickup,
        FaqCategory::Pricing,
        FaqCategory::Account,
        FaqCategory::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FaqCategory::Shipping => "shipping",
            FaqCategory::Tracking => "tracking",
            FaqCategory::Delivery => "delivery",
            FaqCategory::Refund => "refund",
            FaqCategory::Pickup => "pickup",
            FaqCategory::Pricing => "pricing",
            FaqCategory::Account => "account",
            FaqCategory::General => "general",
        }
    }
}

impl std::fmt::Display for FaqCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FaqCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FaqCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Invalid FAQ category: {}", s))
    }
}

impl TryFrom<String> for FaqCategory {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Knowledge-base entry consulted by the bot.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Faq {
    pub id: i64,
    pub question: String,
    pub answer: String,
    /// Comma-delimited keyword list
    pub keywords: String,
    #[sqlx(try_from = "String")]
    pub category: FaqCategory,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Faq {
    /// Keywords trimmed and lowercased, blanks dropped.
    pub fn keywords_list(&self) -> Vec<String> {
        self.keywords
            .split(',')
            .map(|kw| kw.trim().to_lowercase())
            .filter(|kw| !kw.is_empty())
            .collect()
    }
}

/// Data structure for creating a new FAQ.
#[derive(Debug, Clone)]
pub struct FaqForCreate {
    pub question: String,
    pub answer: String,
    pub keywords: String,
    pub category: FaqCategory,
}

impl FaqForCreate {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        keywords: impl Into<String>,
        category: FaqCategory,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            keywords: keywords.into(),
            category,
        }
    }
}

// endregion: --- Knowledge base
