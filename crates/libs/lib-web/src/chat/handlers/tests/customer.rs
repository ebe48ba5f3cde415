use super::*;
use crate::chat::coordinator::{agent_joined_notice, AGENT_REQUESTED_NOTICE};
use crate::chat::handlers::customer::{BOT_APOLOGY, DELIVERY_FAILED_NOTICE};
use crate::chat::protocol::NEW_SESSION_ACTION;
use crate::chat::responder::{menu_text, EMPTY_GREETING};
use crate::chat::router::Group;
use lib_core::{SenderType, SessionStatus};

fn say(text: &str) -> String {
    serde_json::json!({ "type": "message", "message": text }).to_string()
}

#[tokio::test]
async fn test_greeting_gets_menu() {
    // -- Arrange
    let state = test_state().await;
    let faqs = seed_faqs(&state).await;
    let (endpoint, mut rx) = customer(&state, "s1", None).await;

    // -- Act
    endpoint.handle_text(&say("Hello")).await;

    // -- Assert
    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    assert_eq!(message_parts(&events[0]), (SenderType::Customer, "Hello", false));
    assert_eq!(message_parts(&events[1]), (SenderType::Bot, menu_text(&faqs).as_str(), false));

    let transcript = state.coordinator.transcript("s1").await.unwrap();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[1].sender_type, SenderType::Bot);
}

#[tokio::test]
async fn test_keyword_match_and_menu_selection() {
    let state = test_state().await;
    let faqs = seed_faqs(&state).await;
    let (endpoint, mut rx) = customer(&state, "s1", None).await;

    endpoint.handle_text(&say("I want to track my parcel")).await;
    let events = drain(&mut rx);
    assert_eq!(message_parts(&events[1]), (SenderType::Bot, faqs[0].answer.as_str(), false));

    // Frames without a type are chat messages
    endpoint.handle_text(r#"{"message":"2"}"#).await;
    let events = drain(&mut rx);
    assert_eq!(message_parts(&events[0]), (SenderType::Customer, "2", false));
    assert_eq!(message_parts(&events[1]), (SenderType::Bot, faqs[1].answer.as_str(), false));

    endpoint.handle_text(&say("9")).await;
    let events = drain(&mut rx);
    assert_eq!(
        message_parts(&events[1]),
        (SenderType::Bot, "Invalid option. Please select a number between 1 and 4.", false)
    );
}

#[tokio::test]
async fn test_unmatched_text_offers_agent() {
    let state = test_state().await;
    let faqs = seed_faqs(&state).await;
    let (endpoint, mut rx) = customer(&state, "s1", None).await;

    endpoint.handle_text(&say("blorp zzz")).await;

    let events = drain(&mut rx);
    assert_eq!(message_parts(&events[1]), (SenderType::Bot, menu_text(&faqs).as_str(), true));
}

#[tokio::test]
async fn test_empty_knowledge_base() {
    let state = test_state().await;
    let (endpoint, mut rx) = customer(&state, "s1", None).await;

    endpoint.handle_text(&say("hello")).await;
    let events = drain(&mut rx);
    assert_eq!(message_parts(&events[1]), (SenderType::Bot, EMPTY_GREETING, false));

    endpoint.handle_text(&say("blorp zzz")).await;
    let events = drain(&mut rx);
    assert_eq!(message_parts(&events[1]), (SenderType::Bot, BOT_APOLOGY, true));
}

#[tokio::test]
async fn test_escalation_notifies_agents_and_silences_bot() {
    // -- Arrange
    let state = test_state().await;
    seed_faqs(&state).await;
    let dana = user(&state, "dana", Role::Agent).await;
    let (_monitor, mut agent_rx) = monitor(&state, dana).await;
    let (endpoint, mut rx) = customer(&state, "s1", None).await;
    drain(&mut agent_rx);

    // -- Act: the option after the last FAQ asks for a human
    endpoint.handle_text(&say("4")).await;

    // -- Assert
    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    assert_eq!(message_parts(&events[0]), (SenderType::Customer, "4", false));
    assert_eq!(message_parts(&events[1]), (SenderType::System, AGENT_REQUESTED_NOTICE, false));

    let notifications = drain(&mut agent_rx);
    assert_eq!(
        notifications,
        vec![ServerEvent::AgentNotification {
            action: NEW_SESSION_ACTION.to_string(),
            session_id: "s1".to_string(),
        }]
    );
    assert_eq!(state.coordinator.get("s1").await.unwrap().status, SessionStatus::Waiting);

    // While waiting the bot stays quiet
    endpoint.handle_text(&say("hello")).await;
    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert_eq!(message_parts(&events[0]).0, SenderType::Customer);

    // A second request is ignored
    endpoint.handle_text(r#"{"type":"request_agent"}"#).await;
    assert!(drain(&mut rx).is_empty());
    assert!(drain(&mut agent_rx).is_empty());
}

#[tokio::test]
async fn test_escalation_phrase() {
    let state = test_state().await;
    seed_faqs(&state).await;
    let (endpoint, mut rx) = customer(&state, "s1", None).await;

    endpoint.handle_text(&say("Can I speak to an agent please?")).await;

    let events = drain(&mut rx);
    assert_eq!(message_parts(&events[1]), (SenderType::System, AGENT_REQUESTED_NOTICE, false));
}

#[tokio::test]
async fn test_agent_joins_and_replies() {
    // -- Arrange
    let state = test_state().await;
    let ana = user(&state, "ana", Role::Customer).await;
    let dana = user(&state, "dana", Role::Agent).await;
    let (cust, mut cust_rx) = customer(&state, "s1", Some(ana)).await;
    let (agent, mut agent_rx) = customer(&state, "s1", Some(dana)).await;
    cust.handle_text(r#"{"type":"request_agent"}"#).await;
    drain(&mut cust_rx);
    drain(&mut agent_rx);

    // -- Act
    agent.handle_text(r#"{"type":"agent_join"}"#).await;
    agent.handle_text(r#"{"type":"agent_message","message":"Let me check that for you."}"#).await;
    cust.handle_text(&say("Thanks")).await;

    // -- Assert
    let notice = agent_joined_notice("dana");
    for rx in [&mut cust_rx, &mut agent_rx] {
        let events = drain(rx);
        assert_eq!(events.len(), 3);
        assert_eq!(message_parts(&events[0]), (SenderType::System, notice.as_str(), false));
        match &events[1] {
            ServerEvent::Message { sender, sender_name, message, .. } => {
                assert_eq!(*sender, SenderType::Agent);
                assert_eq!(sender_name.as_deref(), Some("dana"));
                assert_eq!(message, "Let me check that for you.");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(message_parts(&events[2]), (SenderType::Customer, "Thanks", false));
    }

    let session = state.coordinator.get("s1").await.unwrap();
    assert_eq!(session.status, SessionStatus::Active);
    assert!(session.customer_id.is_some());

    let transcript = state.coordinator.transcript("s1").await.unwrap();
    let usernames: Vec<_> = transcript.iter().map(|m| m.sender_username.as_deref()).collect();
    assert_eq!(usernames, vec![None, None, Some("dana"), Some("ana")]);
}

#[tokio::test]
async fn test_privileged_events_need_an_agent() {
    let state = test_state().await;
    let ana = user(&state, "ana", Role::Customer).await;
    let (endpoint, mut rx) = customer(&state, "s1", Some(ana)).await;
    endpoint.handle_text(r#"{"type":"request_agent"}"#).await;
    drain(&mut rx);

    endpoint.handle_text(r#"{"type":"agent_message","message":"I am staff"}"#).await;
    endpoint.handle_text(r#"{"type":"agent_join"}"#).await;

    assert!(drain(&mut rx).is_empty());
    assert_eq!(state.coordinator.get("s1").await.unwrap().status, SessionStatus::Waiting);
    assert_eq!(state.coordinator.transcript("s1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_join_has_one_winner() {
    let state = test_state().await;
    let dana = user(&state, "dana", Role::Agent).await;
    let omar = user(&state, "omar", Role::Admin).await;
    let (cust, mut cust_rx) = customer(&state, "s1", None).await;
    let (first, _first_rx) = customer(&state, "s1", Some(dana.clone())).await;
    let (second, _second_rx) = customer(&state, "s1", Some(omar.clone())).await;
    cust.handle_text(r#"{"type":"request_agent"}"#).await;
    drain(&mut cust_rx);

    let join = r#"{"type":"agent_join"}"#;
    tokio::join!(first.handle_text(join), second.handle_text(join));

    let events = drain(&mut cust_rx);
    assert_eq!(events.len(), 1);

    let session = state.coordinator.get("s1").await.unwrap();
    let winner = session.agent_id.unwrap();
    assert!(winner == dana.user_id || winner == omar.user_id);
    let joins = state
        .coordinator
        .transcript("s1")
        .await
        .unwrap()
        .into_iter()
        .filter(|m| m.message.contains("has joined"))
        .count();
    assert_eq!(joins, 1);
}

#[tokio::test]
async fn test_closed_session_is_terminal() {
    // -- Arrange
    let state = test_state().await;
    seed_faqs(&state).await;
    let (endpoint, mut rx) = customer(&state, "s1", None).await;
    let (_viewer, mut viewer_rx) = customer(&state, "s1", None).await;

    // -- Act
    endpoint.handle_text(r#"{"type":"close_chat"}"#).await;

    // -- Assert
    for rx in [&mut rx, &mut viewer_rx] {
        let events = drain(rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ServerEvent::Closed { .. }));
    }

    endpoint.handle_text(&say("hello?")).await;
    endpoint.handle_text(r#"{"type":"request_agent"}"#).await;
    endpoint.handle_text(r#"{"type":"close_chat"}"#).await;

    assert!(drain(&mut rx).is_empty());
    assert!(state.coordinator.transcript("s1").await.unwrap().is_empty());
    assert_eq!(state.coordinator.get("s1").await.unwrap().status, SessionStatus::Closed);
}

#[tokio::test]
async fn test_protocol_errors_are_ignored() {
    let state = test_state().await;
    let (endpoint, mut rx) = customer(&state, "s1", None).await;

    endpoint.handle_text("not json").await;
    endpoint.handle_text(r#"{"type":"dance"}"#).await;
    endpoint.handle_text(&say("   ")).await;
    endpoint.handle_text(&say(&"x".repeat(lib_core::MAX_MESSAGE_LENGTH + 1))).await;

    assert!(drain(&mut rx).is_empty());
    assert!(state.coordinator.transcript("s1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_persistence_failure_notifies_sender_only() {
    let state = test_state().await;
    let (endpoint, mut rx) = customer(&state, "s1", None).await;
    let (_viewer, mut viewer_rx) = customer(&state, "s1", None).await;

    state.db.close().await;
    endpoint.handle_text(&say("is anyone there?")).await;

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert_eq!(message_parts(&events[0]), (SenderType::System, DELIVERY_FAILED_NOTICE, false));
    assert!(drain(&mut viewer_rx).is_empty());
}

#[tokio::test]
async fn test_disconnect_leaves_room_and_keeps_session() {
    let state = test_state().await;
    let (endpoint, _rx) = customer(&state, "s1", None).await;
    assert_eq!(state.router.member_count(&Group::session("s1")).await, 1);

    endpoint.disconnect().await;

    assert_eq!(state.router.group_count().await, 0);
    assert_eq!(state.coordinator.get("s1").await.unwrap().status, SessionStatus::Bot);
}

#[tokio::test]
async fn test_staff_do_not_become_customer() {
    let state = test_state().await;
    let dana = user(&state, "dana", Role::Agent).await;

    let (_endpoint, _rx) = customer(&state, "fresh", Some(dana)).await;

    let session = state.coordinator.get("fresh").await.unwrap();
    assert_eq!(session.customer_id, None);
    assert_eq!(session.status, SessionStatus::Bot);
}

#[tokio::test]
async fn test_bot_stays_quiet_after_takeover_during_delay() {
    // -- Arrange
    let pool = lib_core::create_memory_pool().await.unwrap();
    let mut config = test_config();
    config.chat.bot_delay_ms = 300;
    let state = Arc::new(ChatAppState::new(pool, config));
    seed_faqs(&state).await;
    let dana = user(&state, "dana", Role::Agent).await;
    let (endpoint, mut rx) = customer(&state, "s1", None).await;

    // -- Act
    let takeover = async {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        state.coordinator.request_agent("s1").await.unwrap();
        state.coordinator.join_agent("s1", &dana).await.unwrap();
    };
    let hello = say("hello");
    tokio::join!(endpoint.handle_text(&hello), takeover);

    // -- Assert
    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert_eq!(message_parts(&events[0]), (SenderType::Customer, "hello", false));

    let transcript = state.coordinator.transcript("s1").await.unwrap();
    assert!(transcript.iter().all(|m| m.sender_type != SenderType::Bot));
    assert_eq!(state.coordinator.get("s1").await.unwrap().status, SessionStatus::Active);
}
