//! # Database Store
//!
//! Database connection pool and repository implementations.

// region: --- Modules
pub mod models;
pub mod user_repository;
pub mod session_repository;
pub mod message_repository;
pub mod faq_repository;
// endregion: --- Modules

// region: --- Re-exports
pub use user_repository::UserRepository;
pub use session_repository::ChatSessionRepository;
pub use message_repository::ChatMessageRepository;
pub use faq_repository::FaqRepository;
// endregion: --- Re-exports

// region: --- Types and Functions
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Type alias for SQLite connection pool.
pub type DbPool = SqlitePool;

/// Migrations embedded from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../../migrations");

/// Create a new SQLite connection pool.
///
/// Foreign keys are enforced so deleting a session cascades to its messages
/// and deleting a user nulls the references to it.
pub async fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(options).await?;

    Ok(pool)
}

/// Apply pending migrations.
pub async fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// In-memory database on a single pooled connection, already migrated.
///
/// Every SQLite `:memory:` connection is a separate database, so the pool is
/// capped at one connection.
pub async fn create_memory_pool() -> anyhow::Result<DbPool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
// endregion: --- Types and Functions
