//! # HTTP Request Handlers
//!
//! Axum handlers outside the chat module.
//!
//! ## Handler Modules
//!
//! - **[`faqs`]**: knowledge-base listing and the health probe
//!   - `GET /api/faqs` - List active FAQs
//!   - `GET /health` - Liveness probe
//!
//! Chat sockets and chat REST routes live in [`crate::chat::handlers`].
//!
//! ## Error Handling
//!
//! Handlers return `Result<T, AppError>`; [`lib_core::AppError`] renders
//! `{"error": ..., "code": ...}` with the matching status code.

pub mod faqs;
