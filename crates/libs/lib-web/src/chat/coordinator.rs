//! # Session Coordinator
//!
//! Owns the chat session state machine:
//!
//! ```text
//! bot ──request_agent──▶ waiting ──join_agent──▶ active
//!  │                        │                      │
//!  └────────────close───────┴──────────close───────┴──▶ closed (terminal)
//! ```
//!
//! The database is the only source of truth. Each transition is one guarded
//! `UPDATE` committed together with its system message, so concurrent
//! callers are serialized by SQLite and exactly one of them wins. The
//! coordinator never broadcasts; endpoints fan results out after it returns.

use lib_auth::Identity;
use lib_core::model::store::{ChatMessageRepository, ChatSessionRepository};
use lib_core::{AppError, ChatMessage, ChatSession, DbPool, Result, SenderType, SessionOverview, SessionStatus, TranscriptEntry};
use lib_utils::now_utc;
use tracing::{debug, info};

pub const AGENT_REQUESTED_NOTICE: &str = "Connecting you to an agent. Please wait...";

/// Outcome of a state transition request.
#[derive(Debug, Clone)]
pub enum Transition {
    /// The transition happened. `notice` is the system message recorded with it.
    Applied {
        session: ChatSession,
        notice: Option<ChatMessage>,
    },
    /// The session was not in a state the transition leaves from, or the
    /// caller lacked the privilege. Nothing changed.
    Ignored,
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied { .. })
    }
}

pub fn agent_joined_notice(username: &str) -> String {
    format!("Agent {} has joined the chat. How can I help you?", username)
}

#[derive(Clone)]
pub struct SessionCoordinator {
    db: DbPool,
}

impl SessionCoordinator {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Return the session for `session_id`, creating it in `bot` status on first contact.
    ///
    /// Only customers are recorded as the session's customer; staff opening
    /// an unknown session leave it anonymous.
    pub async fn get_or_create(
        &self,
        session_id: &str,
        requester: Option<&Identity>,
        customer_name: Option<&str>,
    ) -> Result<ChatSession> {
        let customer_id = requester.filter(|id| !id.can_attend()).map(|id| id.user_id);
        let session = ChatSessionRepository::get_or_create(&self.db, session_id, customer_id, customer_name).await?;
        debug!(session_id = %session_id, status = %session.status, "[CHAT] SESSION_READY");
        Ok(session)
    }

    pub async fn get(&self, session_id: &str) -> Result<ChatSession> {
        ChatSessionRepository::find(&self.db, session_id)
            .await?
            .ok_or_else(|| not_found(session_id))
    }

    /// Persist one transcript entry with the current time.
    ///
    /// # Errors
    ///
    /// - [`AppError::SessionClosed`] if the session is closed
    /// - [`AppError::NotFound`] if there is no such session
    /// - [`AppError::Database`] if the insert failed
    pub async fn record(
        &self,
        session_id: &str,
        sender: SenderType,
        text: &str,
        author: Option<&Identity>,
    ) -> Result<ChatMessage> {
        let sender_id = author.map(|id| id.user_id);
        match ChatMessageRepository::create(&self.db, session_id, sender, sender_id, text, now_utc()).await? {
            Some(message) => Ok(message),
            None => Err(self.rejection(session_id).await),
        }
    }

    /// `bot` → `waiting`, recording the hand-off notice.
    pub async fn request_agent(&self, session_id: &str) -> Result<Transition> {
        let mut tx = self.db.begin().await?;

        if ChatSessionRepository::mark_waiting(&mut *tx, session_id).await? == 0 {
            drop(tx);
            return self.ignored(session_id).await;
        }

        let notice = ChatMessageRepository::create(
            &mut *tx,
            session_id,
            SenderType::System,
            None,
            AGENT_REQUESTED_NOTICE,
            now_utc(),
        )
        .await?
        .ok_or_else(|| AppError::Internal(format!("notice not recorded for {}", session_id)))?;
        let session = ChatSessionRepository::find(&mut *tx, session_id)
            .await?
            .ok_or_else(|| not_found(session_id))?;
        tx.commit().await?;

        info!(session_id = %session_id, "[CHAT] AGENT_REQUESTED");
        Ok(Transition::Applied { session, notice: Some(notice) })
    }

    /// `waiting` → `active` with `agent` assigned, recording the join notice.
    ///
    /// Callers without agent privilege get [`Transition::Ignored`].
    pub async fn join_agent(&self, session_id: &str, agent: &Identity) -> Result<Transition> {
        if !agent.can_attend() {
            debug!(session_id = %session_id, user_id = agent.user_id, "[CHAT] JOIN_DENIED - not an agent");
            return Ok(Transition::Ignored);
        }

        let mut tx = self.db.begin().await?;
        let at = now_utc();

        if ChatSessionRepository::assign_agent(&mut *tx, session_id, agent.user_id, at).await? == 0 {
            drop(tx);
            return self.ignored(session_id).await;
        }

        let notice = ChatMessageRepository::create(
            &mut *tx,
            session_id,
            SenderType::System,
            None,
            &agent_joined_notice(&agent.username),
            at,
        )
        .await?
        .ok_or_else(|| AppError::Internal(format!("notice not recorded for {}", session_id)))?;
        let session = ChatSessionRepository::find(&mut *tx, session_id)
            .await?
            .ok_or_else(|| not_found(session_id))?;
        tx.commit().await?;

        info!(session_id = %session_id, agent = %agent.username, "[CHAT] AGENT_JOINED");
        Ok(Transition::Applied { session, notice: Some(notice) })
    }

    /// Any open state → `closed`. Nothing is recorded.
    pub async fn close(&self, session_id: &str) -> Result<Transition> {
        if ChatSessionRepository::close(&self.db, session_id, now_utc()).await? == 0 {
            return Err(self.rejection(session_id).await);
        }

        let session = self.get(session_id).await?;
        info!(session_id = %session_id, "[CHAT] SESSION_CLOSED");
        Ok(Transition::Applied { session, notice: None })
    }

    /// Sessions waiting for an agent, oldest first.
    pub async fn waiting_sessions(&self) -> Result<Vec<SessionOverview>> {
        Ok(ChatSessionRepository::list_by_status(&self.db, SessionStatus::Waiting).await?)
    }

    /// Full transcript, in recording order.
    pub async fn transcript(&self, session_id: &str) -> Result<Vec<TranscriptEntry>> {
        Ok(ChatMessageRepository::list_for_session(&self.db, session_id).await?)
    }

    // Explains why a guarded transition touched no row.
    async fn ignored(&self, session_id: &str) -> Result<Transition> {
        let session = self.get(session_id).await?;
        if session.status.is_closed() {
            return Err(AppError::SessionClosed(session_id.to_string()));
        }
        debug!(session_id = %session_id, status = %session.status, "[CHAT] TRANSITION_IGNORED");
        Ok(Transition::Ignored)
    }

    async fn rejection(&self, session_id: &str) -> AppError {
        match ChatSessionRepository::find(&self.db, session_id).await {
            Ok(Some(_)) => AppError::SessionClosed(session_id.to_string()),
            Ok(None) => not_found(session_id),
            Err(e) => e.into(),
        }
    }
}

fn not_found(session_id: &str) -> AppError {
    AppError::NotFound(format!("Chat session {} not found", session_id))
}
