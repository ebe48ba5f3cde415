//! # Channel Router
//!
//! Group-addressed fan-out for chat connections.
//!
//! Every connection owns a bounded outbound queue (`mpsc::Sender<ServerEvent>`)
//! drained by its socket writer. The router keeps the membership registry:
//! one group per session token and one shared group for agent monitoring
//! connections. `join`, `leave` and `leave_all` are its only mutators.
//!
//! Delivery uses `try_send`, so a full or closed queue never blocks delivery
//! to the other members. Events for a full queue are dropped and logged.

use crate::chat::protocol::ServerEvent;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};
use uuid::Uuid;

/// Identifier of one live connection.
pub type ConnId = Uuid;

/// Broadcast group address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Group {
    /// Everyone viewing one chat session
    Session(String),
    /// All agent monitoring connections
    Agents,
}

impl Group {
    pub fn session(session_id: impl Into<String>) -> Self {
        Group::Session(session_id.into())
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Session(id) => write!(f, "chat_{}", id),
            Group::Agents => f.write_str("agents_room"),
        }
    }
}

type Members = HashMap<ConnId, mpsc::Sender<ServerEvent>>;

/// Membership registry and broadcaster.
#[derive(Clone, Default)]
pub struct ChannelRouter {
    groups: Arc<RwLock<HashMap<Group, Members>>>,
}

impl ChannelRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a group. Returns `false` if it was already a member.
    pub async fn join(&self, group: Group, conn_id: ConnId, outbound: mpsc::Sender<ServerEvent>) -> bool {
        let mut groups = self.groups.write().await;
        let members = groups.entry(group.clone()).or_default();
        let joined = members.insert(conn_id, outbound).is_none();
        debug!(group = %group, conn_id = %conn_id, members = members.len(), "[CHAT] GROUP_JOIN");
        joined
    }

    /// Remove a connection from a group. Empty groups are dropped.
    pub async fn leave(&self, group: &Group, conn_id: ConnId) {
        let mut groups = self.groups.write().await;
        if let Some(members) = groups.get_mut(group) {
            members.remove(&conn_id);
            if members.is_empty() {
                groups.remove(group);
            }
        }
        debug!(group = %group, conn_id = %conn_id, "[CHAT] GROUP_LEAVE");
    }

    /// Remove a connection from every group it joined.
    pub async fn leave_all(&self, conn_id: ConnId) {
        let mut groups = self.groups.write().await;
        groups.retain(|_, members| {
            members.remove(&conn_id);
            !members.is_empty()
        });
    }

    /// Deliver `event` to every member of `group`. Returns how many queues accepted it.
    ///
    /// Broadcasting to an unknown or empty group is a no-op.
    pub async fn broadcast(&self, group: &Group, event: &ServerEvent) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();

        {
            let groups = self.groups.read().await;
            let Some(members) = groups.get(group) else {
                return 0;
            };

            for (conn_id, outbound) in members {
                match outbound.try_send(event.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        warn!(
                            group = %group,
                            conn_id = %conn_id,
                            event = event.kind(),
                            "[CHAT] OUTBOUND_FULL - dropping event for slow connection"
                        );
                    }
                    Err(TrySendError::Closed(_)) => closed.push(*conn_id),
                }
            }
        }

        for conn_id in closed {
            self.leave(group, conn_id).await;
        }

        debug!(group = %group, event = event.kind(), delivered, "[CHAT] BROADCAST");
        delivered
    }

    /// Number of connections currently in `group`.
    pub async fn member_count(&self, group: &Group) -> usize {
        self.groups.read().await.get(group).map_or(0, HashMap::len)
    }

    /// Number of non-empty groups.
    pub async fn group_count(&self) -> usize {
        self.groups.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(text: &str) -> ServerEvent {
        ServerEvent::notice(text)
    }

    fn text_of(event: ServerEvent) -> String {
        match event {
            ServerEvent::Message { message, .. } => message,
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_broadcast_reaches_only_group_members() {
        let router = ChannelRouter::new();
        let (tx_a, mut rx_a) = mpsc::channel(8);
        let (tx_b, mut rx_b) = mpsc::channel(8);
        let (tx_agent, mut rx_agent) = mpsc::channel(8);

        router.join(Group::session("s1"), Uuid::new_v4(), tx_a).await;
        router.join(Group::session("s2"), Uuid::new_v4(), tx_b).await;
        router.join(Group::Agents, Uuid::new_v4(), tx_agent).await;

        assert_eq!(router.broadcast(&Group::session("s1"), &event("hello")).await, 1);

        assert_eq!(text_of(rx_a.try_recv().unwrap()), "hello");
        assert!(rx_b.try_recv().is_err());
        assert!(rx_agent.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_empty_group_broadcast_is_noop() {
        let router = ChannelRouter::new();

        assert_eq!(router.broadcast(&Group::session("nobody"), &event("lost")).await, 0);

        let (tx, mut rx) = mpsc::channel(8);
        router.join(Group::session("nobody"), Uuid::new_v4(), tx).await;
        router.broadcast(&Group::session("nobody"), &event("found")).await;
        assert_eq!(text_of(rx.try_recv().unwrap()), "found");
    }

    #[tokio::test]
    async fn test_full_queue_does_not_block_others() {
        let router = ChannelRouter::new();
        let (slow_tx, _slow_rx) = mpsc::channel(1);
        let (fast_tx, mut fast_rx) = mpsc::channel(8);
        let group = Group::session("s1");

        router.join(group.clone(), Uuid::new_v4(), slow_tx).await;
        router.join(group.clone(), Uuid::new_v4(), fast_tx).await;

        router.broadcast(&group, &event("one")).await;
        let delivered = router.broadcast(&group, &event("two")).await;

        assert_eq!(delivered, 1);
        assert_eq!(text_of(fast_rx.try_recv().unwrap()), "one");
        assert_eq!(text_of(fast_rx.try_recv().unwrap()), "two");
    }

    #[tokio::test]
    async fn test_leave_all_drops_empty_groups_and_closed_queues() {
        let router = ChannelRouter::new();
        let conn = Uuid::new_v4();
        let (tx, _rx) = mpsc::channel(8);

        assert!(router.join(Group::session("s1"), conn, tx.clone()).await);
        assert!(!router.join(Group::session("s1"), conn, tx.clone()).await);
        router.join(Group::Agents, conn, tx).await;
        assert_eq!(router.group_count().await, 2);

        router.leave_all(conn).await;
        assert_eq!(router.group_count().await, 0);

        let (gone_tx, gone_rx) = mpsc::channel(8);
        router.join(Group::Agents, Uuid::new_v4(), gone_tx).await;
        drop(gone_rx);
        assert_eq!(router.broadcast(&Group::Agents, &event("x")).await, 0);
        assert_eq!(router.member_count(&Group::Agents).await, 0);
    }
}
