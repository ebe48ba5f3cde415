//! # Middleware
//!
//! Axum middleware for authentication, request stamping, and request logging.
//!
//! ## Modules
//!
//! - **[`mw_auth`]**: bearer-token resolution into an [`Identity`](lib_auth::Identity)
//! - **[`mw_req_stamp`]**: request ID stamping (`X-Request-ID`)
//! - **[`mw_logging`]**: structured request/response logging

// region: --- Modules
pub mod mw_auth;
pub mod mw_req_stamp;
pub mod mw_logging;
// endregion: --- Modules

// region: --- Re-exports
pub use mw_auth::{bearer_token, require_auth, resolve_identity};
pub use mw_req_stamp::{stamp_req, RequestStamp, REQUEST_ID_HEADER};
pub use mw_logging::log_requests;
// endregion: --- Re-exports
