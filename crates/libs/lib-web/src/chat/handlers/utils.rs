//! # Chat Handler Utilities
//!
//! Shared helpers for the chat socket handlers: query parsing, input
//! validation and the socket pump that connects a WebSocket to an
//! endpoint's outbound queue.

use crate::chat::protocol::ServerEvent;
use crate::chat::router::ConnId;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use lib_core::{AppError, MAX_MESSAGE_LENGTH};
use lib_utils::{validate_max_length, validate_not_empty};
use serde::Deserialize;
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

const MAX_SESSION_ID_LEN: usize = 128;
const MAX_DISPLAY_NAME_LEN: usize = 100;

/// Query parameters accepted by the chat sockets.
#[derive(Debug, Default, Deserialize)]
pub struct ChatSocketQuery {
    /// Bearer token for browsers that cannot set headers on WebSockets
    pub token: Option<String>,
    /// Display name of an anonymous customer
    pub name: Option<String>,
}

impl ChatSocketQuery {
    /// Trimmed display name, dropped when blank or too long.
    pub fn display_name(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty() && n.chars().count() <= MAX_DISPLAY_NAME_LEN)
            .map(str::to_string)
    }
}

/// Session tokens are opaque but bounded.
pub fn validate_session_id(session_id: &str) -> Result<(), AppError> {
    validate_not_empty(session_id.trim(), "session_id").map_err(AppError::InvalidInput)?;
    validate_max_length(session_id, MAX_SESSION_ID_LEN, "session_id").map_err(AppError::InvalidInput)?;
    Ok(())
}

/// Trimmed chat text, or `None` if it is empty or too long.
pub fn chat_text(raw: &str) -> Option<&str> {
    let text = raw.trim();
    if validate_not_empty(text, "message").is_err() {
        return None;
    }
    validate_max_length(text, MAX_MESSAGE_LENGTH, "message").ok()?;
    Some(text)
}

/// Connect `socket` to an endpoint.
///
/// Events from `outbound_rx` are serialized and written by a spawned task;
/// inbound text frames are handed to `on_text` one at a time, each running
/// to completion. Returns when the client goes away, leaving the writer
/// task to the caller so it can be stopped after the endpoint has left its
/// groups.
pub async fn pump_socket<F, Fut>(
    socket: WebSocket,
    mut outbound_rx: mpsc::Receiver<ServerEvent>,
    conn_id: ConnId,
    mut on_text: F,
) -> JoinHandle<()>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = ()>,
{
    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    error!(conn_id = %conn_id, error = %e, "[WS] SERIALIZE_ERROR conn_id={} error={}", conn_id, e);
                    continue;
                }
            };

            if let Err(e) = sender.send(Message::Text(json.into())).await {
                debug!(conn_id = %conn_id, error = %e, "[WS] SEND_FAILED conn_id={} - client gone", conn_id);
                break;
            }
        }
    });

    loop {
        tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => on_text(text.as_str().to_owned()).await,
                Some(Ok(Message::Close(_))) | None => {
                    debug!(conn_id = %conn_id, "[WS] CLOSE_RECEIVED conn_id={}", conn_id);
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(conn_id = %conn_id, error = %e, "[WS] RECEIVE_ERROR conn_id={} error={}", conn_id, e);
                    break;
                }
            },
            _ = &mut send_task => break,
        }
    }

    send_task
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_text_bounds() {
        assert_eq!(chat_text("  where is my parcel?  "), Some("where is my parcel?"));
        assert_eq!(chat_text("   "), None);
        assert_eq!(chat_text(""), None);
        assert!(chat_text(&"x".repeat(MAX_MESSAGE_LENGTH)).is_some());
        assert!(chat_text(&"x".repeat(MAX_MESSAGE_LENGTH + 1)).is_none());
    }

    #[test]
    fn test_display_name() {
        let query = ChatSocketQuery { token: None, name: Some("  Ana ".to_string()) };
        assert_eq!(query.display_name().as_deref(), Some("Ana"));

        let blank = ChatSocketQuery { token: None, name: Some(" ".to_string()) };
        assert_eq!(blank.display_name(), None);
    }

    #[test]
    fn test_session_id_validation() {
        assert!(validate_session_id("0b6f7c1e-2f7e-4d0c-9d43-8f6e7f1a2b3c").is_ok());
        assert!(validate_session_id(" ").is_err());
        assert!(validate_session_id(&"a".repeat(MAX_SESSION_ID_LEN + 1)).is_err());
    }
}
