//! # Core Library
//!
//! Configuration, error type, and the SQLite store behind the support chat.

pub mod config;
pub mod error;
pub mod model;
pub mod dto;

// Re-export commonly used types
pub use config::{ChatSettings, Config, MAX_MESSAGE_LENGTH};
pub use error::{AppError, Result};
pub use model::store::{DbPool, create_pool, create_memory_pool, run_migrations};
pub use model::store::models::{
    ChatMessage, ChatSession, Faq, FaqCategory, FaqForCreate, SenderType, SessionOverview,
    SessionStatus, TranscriptEntry, User,
};
