//! # Chat Handlers
//!
//! Socket endpoints and HTTP handlers for the support chat.

// region: --- Modules
pub mod utils;
pub mod customer;
pub mod agent;
pub mod history;

#[cfg(test)]
mod tests;
// endregion: --- Modules

// region: --- Re-exports
pub use customer::{customer_chat_websocket, CustomerEndpoint};
pub use agent::{agent_dashboard_websocket, AgentEndpoint};
pub use history::{agent_dashboard, create_session, get_chat_history, mark_history_read};
// endregion: --- Re-exports
