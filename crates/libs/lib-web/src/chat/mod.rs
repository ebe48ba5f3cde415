//! # Chat Module
//!
//! Bot-first support chat with handoff to human agents over WebSockets.
//!
//! - [`router`]: connection groups and fan-out
//! - [`coordinator`]: session state machine on top of the store
//! - [`responder`]: keyword/menu bot
//! - [`protocol`]: wire frames
//! - [`handlers`]: socket endpoints and the chat REST routes

pub mod coordinator;
pub mod handlers;
pub mod protocol;
pub mod responder;
pub mod router;
pub mod state;

pub use coordinator::{SessionCoordinator, Transition};
pub use protocol::{AgentClientEvent, ClientEvent, ServerEvent, WaitingSession};
pub use responder::{respond, BotReply, ResponderConfig};
pub use router::{ChannelRouter, ConnId, Group};
pub use state::ChatAppState;
