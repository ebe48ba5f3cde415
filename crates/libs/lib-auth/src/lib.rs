//! # Authentication Library
//!
//! Bearer-token claims and the role/identity capability checked at the chat
//! endpoints before any privileged operation.

pub mod identity;
pub mod token;

// Re-export commonly used types
pub use identity::{Identity, Role};
pub use token::{Claims, TokenError, encode_jwt, decode_jwt, identity_from_token};
