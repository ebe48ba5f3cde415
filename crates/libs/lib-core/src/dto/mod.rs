//! # Data Transfer Objects (DTOs)
//!
//! This module contains the data structures exchanged with chat widgets and
//! the agent dashboard over the REST API.

pub mod chat;

pub use chat::*;
