//! # User Repository
//!
//! Database access for the accounts that chat sessions and messages refer to.
//!
//! Accounts are owned by the wider shipping application; the chat only needs
//! to create, look up and (in tests and tooling) remove them.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use lib_core::model::store::{UserRepository, create_memory_pool};
//! # use lib_auth::Role;
//! # async fn example() -> anyhow::Result<()> {
//! let pool = create_memory_pool().await?;
//!
//! let agent = UserRepository::create(&pool, "dana", Role::Agent).await?;
//! let found = UserRepository::find_by_username(&pool, "dana").await?;
//! assert_eq!(found.map(|u| u.id), Some(agent.id));
//! # Ok(())
//! # }
//! ```

use super::models::User;
use super::DbPool;
use lib_auth::{Identity, Role};
use lib_utils::now_utc;
use sqlx::query_as;

/// User repository for database operations.
pub struct UserRepository;

impl UserRepository {
    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the username is already taken (UNIQUE
    /// constraint) or the database is unavailable.
    pub async fn create(pool: &DbPool, username: &str, role: Role) -> Result<User, sqlx::Error> {
        query_as::<_, User>(
            r#"
            INSERT INTO users (username, role, created_at)
            VALUES (?, ?, ?)
            RETURNING id, username, role, created_at
            "#,
        )
        .bind(username)
        .bind(role.as_str())
        .bind(now_utc())
        .fetch_one(pool)
        .await
    }

    /// Find a user by id.
    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT id, username, role, created_at FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by their username.
    pub async fn find_by_username(pool: &DbPool, username: &str) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT id, username, role, created_at FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Return the existing user with this username, or create one.
    ///
    /// An existing account keeps its stored role.
    pub async fn find_or_create(pool: &DbPool, username: &str, role: Role) -> Result<User, sqlx::Error> {
        if let Some(user) = Self::find_by_username(pool, username).await? {
            return Ok(user);
        }
        Self::create(pool, username, role).await
    }

    /// Delete a user. Chat references to the user are set to NULL.
    ///
    /// Returns whether a row was removed.
    pub async fn delete(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Identity::new(user.id, user.username.clone(), user.role)
    }
}
