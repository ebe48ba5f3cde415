//! # Chat Message Repository
//!
//! Append-only transcript storage. Messages are ordered by insertion (`id`)
//! and never change after creation except for the read flag.

use super::models::{ChatMessage, SenderType, TranscriptEntry};
use super::DbPool;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, Executor, Sqlite};

pub struct ChatMessageRepository;

impl ChatMessageRepository {
    /// Append a message to the session identified by `session_id`.
    ///
    /// The insert only happens while the session is open; `Ok(None)` means
    /// the session is missing or closed.
    pub async fn create<'e, E>(
        executor: E,
        session_id: &str,
        sender_type: SenderType,
        sender_id: Option<i64>,
        message: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<ChatMessage>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (chat_session_id, sender_type, sender_id, message, timestamp, is_read)
            SELECT id, ?, ?, ?, ?, 0
            FROM chat_sessions
            WHERE session_id = ? AND status <> 'closed'
            RETURNING id, chat_session_id, sender_type, sender_id, message, timestamp, is_read
            "#,
        )
        .bind(sender_type.as_str())
        .bind(sender_id)
        .bind(message)
        .bind(timestamp)
        .bind(session_id)
        .fetch_optional(executor)
        .await
    }

    /// Full transcript of a session in insertion order, with sender usernames.
    pub async fn list_for_session(
        pool: &DbPool,
        session_id: &str,
    ) -> Result<Vec<TranscriptEntry>, sqlx::Error> {
        query_as::<_, TranscriptEntry>(
            r#"
            SELECT
                m.id,
                m.sender_type,
                m.sender_id,
                u.username AS sender_username,
                m.message,
                m.timestamp,
                m.is_read
            FROM chat_messages m
            JOIN chat_sessions s ON s.id = m.chat_session_id
            LEFT JOIN users u ON u.id = m.sender_id
            WHERE s.session_id = ?
            ORDER BY m.id ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(pool)
        .await
    }

    /// Flag every unread message from `sender_type` in the session as read.
    ///
    /// Returns the number of messages updated.
    pub async fn mark_read(
        pool: &DbPool,
        session_id: &str,
        sender_type: SenderType,
    ) -> Result<u64, sqlx::Error> {
        let result = query(
            r#"
            UPDATE chat_messages
            SET is_read = 1
            WHERE is_read = 0
              AND sender_type = ?
              AND chat_session_id = (SELECT id FROM chat_sessions WHERE session_id = ?)
            "#,
        )
        .bind(sender_type.as_str())
        .bind(session_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
