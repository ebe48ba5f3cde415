//! # Chat Session Repository
//!
//! Storage for [`ChatSession`] rows.
//!
//! Every status change is a single conditional `UPDATE` guarded by the
//! states it may leave from, so concurrent callers race inside SQLite and
//! exactly one of them observes an affected row. The transition helpers
//! accept any executor so callers can pair them with a transcript insert in
//! one transaction.

use super::models::{ChatSession, SessionOverview, SessionStatus};
use super::DbPool;
use chrono::{DateTime, Utc};
use lib_utils::now_utc;
use sqlx::{query, query_as, Sqlite, Executor};

const SESSION_COLUMNS: &str = "id, session_id, customer_id, customer_name, agent_id, status, \
     started_at, agent_joined_at, ended_at";

const OVERVIEW_SELECT: &str = r#"
    SELECT
        s.session_id,
        s.status,
        c.username AS customer_username,
        s.customer_name,
        a.username AS agent_username,
        s.started_at,
        s.agent_joined_at
    FROM chat_sessions s
    LEFT JOIN users c ON c.id = s.customer_id
    LEFT JOIN users a ON a.id = s.agent_id
"#;

pub struct ChatSessionRepository;

impl ChatSessionRepository {
    /// Find a session by its token.
    pub async fn find<'e, E>(executor: E, session_id: &str) -> Result<Option<ChatSession>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        query_as::<_, ChatSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM chat_sessions WHERE session_id = ?"
        ))
        .bind(session_id)
        .fetch_optional(executor)
        .await
    }

    /// Return the session for `session_id`, creating it in `bot` status if absent.
    ///
    /// Idempotent on the token: the customer reference and display name are
    /// only written on creation.
    pub async fn get_or_create(
        pool: &DbPool,
        session_id: &str,
        customer_id: Option<i64>,
        customer_name: Option<&str>,
    ) -> Result<ChatSession, sqlx::Error> {
        query(
            r#"
            INSERT INTO chat_sessions (session_id, customer_id, customer_name, status, started_at)
            VALUES (?, ?, ?, 'bot', ?)
            ON CONFLICT(session_id) DO NOTHING
            "#,
        )
        .bind(session_id)
        .bind(customer_id)
        .bind(customer_name)
        .bind(now_utc())
        .execute(pool)
        .await?;

        Self::find(pool, session_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// `bot` → `waiting`. Returns the number of rows changed (0 or 1).
    pub async fn mark_waiting<'e, E>(executor: E, session_id: &str) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = query(
            "UPDATE chat_sessions SET status = 'waiting' WHERE session_id = ? AND status = 'bot'",
        )
        .bind(session_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// `waiting` → `active` with the given agent. Returns rows changed (0 or 1).
    ///
    /// `agent_joined_at` is only set the first time an agent joins.
    pub async fn assign_agent<'e, E>(
        executor: E,
        session_id: &str,
        agent_id: i64,
        at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = query(
            r#"
            UPDATE chat_sessions
            SET status = 'active',
                agent_id = ?,
                agent_joined_at = COALESCE(agent_joined_at, ?)
            WHERE session_id = ? AND status = 'waiting'
            "#,
        )
        .bind(agent_id)
        .bind(at)
        .bind(session_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Any open state → `closed`. Returns rows changed (0 or 1).
    pub async fn close<'e, E>(executor: E, session_id: &str, at: DateTime<Utc>) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = query(
            r#"
            UPDATE chat_sessions
            SET status = 'closed', ended_at = ?
            WHERE session_id = ? AND status <> 'closed'
            "#,
        )
        .bind(at)
        .bind(session_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Sessions in `status`, oldest first.
    pub async fn list_by_status(
        pool: &DbPool,
        status: SessionStatus,
    ) -> Result<Vec<SessionOverview>, sqlx::Error> {
        query_as::<_, SessionOverview>(&format!(
            "{OVERVIEW_SELECT} WHERE s.status = ? ORDER BY s.started_at ASC, s.id ASC"
        ))
        .bind(status.as_str())
        .fetch_all(pool)
        .await
    }

    /// Active sessions attended by `agent_id`, oldest first.
    pub async fn list_active_for_agent(
        pool: &DbPool,
        agent_id: i64,
    ) -> Result<Vec<SessionOverview>, sqlx::Error> {
        query_as::<_, SessionOverview>(&format!(
            "{OVERVIEW_SELECT} WHERE s.status = 'active' AND s.agent_id = ? \
             ORDER BY s.started_at ASC, s.id ASC"
        ))
        .bind(agent_id)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::store::{create_memory_pool, UserRepository};
    use lib_auth::Role;

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let pool = create_memory_pool().await.unwrap();

        let first = ChatSessionRepository::get_or_create(&pool, "tok-1", None, Some("Ana"))
            .await
            .unwrap();
        let second = ChatSessionRepository::get_or_create(&pool, "tok-1", None, Some("Other"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.status, SessionStatus::Bot);
        assert_eq!(second.customer_name.as_deref(), Some("Ana"));
        assert_eq!(first.started_at, second.started_at);
    }

    #[tokio::test]
    async fn test_transitions_are_guarded() {
        let pool = create_memory_pool().await.unwrap();
        let agent = UserRepository::create(&pool, "dana", Role::Agent).await.unwrap();
        ChatSessionRepository::get_or_create(&pool, "tok", None, None).await.unwrap();

        // bot cannot jump straight to active
        assert_eq!(ChatSessionRepository::assign_agent(&pool, "tok", agent.id, now_utc()).await.unwrap(), 0);
        assert_eq!(ChatSessionRepository::mark_waiting(&pool, "tok").await.unwrap(), 1);
        assert_eq!(ChatSessionRepository::mark_waiting(&pool, "tok").await.unwrap(), 0);
        assert_eq!(ChatSessionRepository::assign_agent(&pool, "tok", agent.id, now_utc()).await.unwrap(), 1);
        assert_eq!(ChatSessionRepository::close(&pool, "tok", now_utc()).await.unwrap(), 1);
        assert_eq!(ChatSessionRepository::close(&pool, "tok", now_utc()).await.unwrap(), 0);

        let session = ChatSessionRepository::find(&pool, "tok").await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Closed);
        assert_eq!(session.agent_id, Some(agent.id));
        assert!(session.agent_joined_at.is_some());
        assert!(session.ended_at.is_some());
    }

    #[tokio::test]
    async fn test_list_by_status_joins_usernames() {
        let pool = create_memory_pool().await.unwrap();
        let customer = UserRepository::create(&pool, "sam", Role::Customer).await.unwrap();
        ChatSessionRepository::get_or_create(&pool, "a", Some(customer.id), None).await.unwrap();
        ChatSessionRepository::get_or_create(&pool, "b", None, Some("Guest")).await.unwrap();
        ChatSessionRepository::get_or_create(&pool, "c", None, None).await.unwrap();
        ChatSessionRepository::mark_waiting(&pool, "a").await.unwrap();
        ChatSessionRepository::mark_waiting(&pool, "b").await.unwrap();

        let waiting = ChatSessionRepository::list_by_status(&pool, SessionStatus::Waiting)
            .await
            .unwrap();
        let ids: Vec<_> = waiting.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(waiting[0].customer_username.as_deref(), Some("sam"));
        assert_eq!(waiting[1].customer_name.as_deref(), Some("Guest"));
    }

    #[tokio::test]
    async fn test_deleting_user_nulls_reference() {
        let pool = create_memory_pool().await.unwrap();
        let customer = UserRepository::create(&pool, "sam", Role::Customer).await.unwrap();
        ChatSessionRepository::get_or_create(&pool, "tok", Some(customer.id), None).await.unwrap();

        assert!(UserRepository::delete(&pool, customer.id).await.unwrap());

        let session = ChatSessionRepository::find(&pool, "tok").await.unwrap().unwrap();
        assert_eq!(session.customer_id, None);
    }
}
