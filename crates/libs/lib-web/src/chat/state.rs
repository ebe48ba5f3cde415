//! # Chat State
//!
//! Shared state behind every chat connection: the database, configuration,
//! the channel router and the session coordinator.

use crate::chat::coordinator::SessionCoordinator;
use crate::chat::responder::ResponderConfig;
use crate::chat::router::ChannelRouter;
use lib_core::{Config, DbPool};
use std::time::Duration;

/// Application state for the chat module
pub struct ChatAppState {
    pub db: DbPool,
    pub config: Config,
    pub router: ChannelRouter,
    pub coordinator: SessionCoordinator,
    pub responder: ResponderConfig,
}

impl ChatAppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        Self {
            router: ChannelRouter::new(),
            coordinator: SessionCoordinator::new(db.clone()),
            responder: ResponderConfig::from(&config.chat),
            db,
            config,
        }
    }

    /// Pause before each bot reply.
    pub fn bot_delay(&self) -> Duration {
        Duration::from_millis(self.config.chat.bot_delay_ms)
    }

    /// Capacity of a new connection's outbound queue.
    pub fn outbound_buffer(&self) -> usize {
        self.config.chat.outbound_buffer.max(1)
    }
}
