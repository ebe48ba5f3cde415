//! Endpoint tests. Connections are driven through in-process outbound
//! channels instead of real sockets.

mod customer;

use crate::chat::handlers::{AgentEndpoint, CustomerEndpoint};
use crate::chat::protocol::ServerEvent;
use crate::chat::state::ChatAppState;
use lib_auth::{Identity, Role};
use lib_core::model::store::{FaqRepository, UserRepository};
use lib_core::{create_memory_pool, ChatSettings, Config, Faq, FaqCategory, FaqForCreate};
use std::sync::Arc;
use tokio::sync::mpsc;

pub(super) const SECRET: &str = "test-secret-key-with-at-least-32-characters";

pub(super) fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: SECRET.to_string(),
        jwt_expiration_hours: 1,
        bind_address: "127.0.0.1:0".to_string(),
        chat: ChatSettings {
            bot_delay_ms: 0,
            ..ChatSettings::default()
        },
    }
}

pub(super) async fn test_state() -> Arc<ChatAppState> {
    let pool = create_memory_pool().await.unwrap();
    Arc::new(ChatAppState::new(pool, test_config()))
}

/// Three entries, in menu order.
pub(super) async fn seed_faqs(state: &ChatAppState) -> Vec<Faq> {
    let entries = [
        FaqForCreate::new(
            "How do I track my parcel?",
            "Enter your tracking number on the Track page to see live status.",
            "track, tracking, parcel location",
            FaqCategory::Tracking,
        ),
        FaqForCreate::new(
            "How long does delivery take?",
            "Standard delivery takes 2-4 working days.",
            "delivery time, how long, days",
            FaqCategory::Delivery,
        ),
        FaqForCreate::new(
            "Can I get a refund?",
            "Refunds are issued within 7 days of a confirmed claim.",
            "refund, money back",
            FaqCategory::Refund,
        ),
    ];
    for entry in entries {
        FaqRepository::create(&state.db, entry).await.unwrap();
    }
    FaqRepository::list_active(&state.db).await.unwrap()
}

pub(super) async fn user(state: &ChatAppState, username: &str, role: Role) -> Identity {
    let user = UserRepository::create(&state.db, username, role).await.unwrap();
    Identity::from(&user)
}

pub(super) async fn customer(
    state: &Arc<ChatAppState>,
    session_id: &str,
    identity: Option<Identity>,
) -> (CustomerEndpoint, mpsc::Receiver<ServerEvent>) {
    let (tx, rx) = mpsc::channel(32);
    let endpoint = CustomerEndpoint::connect(state.clone(), session_id.to_string(), identity, None, tx)
        .await
        .unwrap();
    (endpoint, rx)
}

pub(super) async fn monitor(
    state: &Arc<ChatAppState>,
    identity: Identity,
) -> (AgentEndpoint, mpsc::Receiver<ServerEvent>) {
    let (tx, rx) = mpsc::channel(32);
    let endpoint = AgentEndpoint::connect(state.clone(), identity, tx).await.unwrap();
    (endpoint, rx)
}

/// Everything queued so far.
pub(super) fn drain(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// `(sender, text, show_agent_button)` of a message frame.
pub(super) fn message_parts(event: &ServerEvent) -> (lib_core::SenderType, &str, bool) {
    match event {
        ServerEvent::Message { sender, message, show_agent_button, .. } => (*sender, message.as_str(), *show_agent_button),
        other => panic!("expected message frame, got {:?}", other),
    }
}
