//! End-to-end routing tests over in-memory stores: validation, fan-out,
//! membership scoping, typing relay, and error delivery.

mod support;

use std::sync::Arc;

use crewchat_core::config::realtime::RealtimeConfig;
use crewchat_core::types::UserId;
use crewchat_realtime::event::{ClientEvent, ServerEvent};
use crewchat_realtime::server::ChatEngine;

use support::{InMemoryGroups, InMemoryMessages, InMemoryUsers};

struct Harness {
    engine: ChatEngine,
    users: Arc<InMemoryUsers>,
    groups: Arc<InMemoryGroups>,
    messages: Arc<InMemoryMessages>,
}

impl Harness {
    fn new() -> Self {
        let users = Arc::new(InMemoryUsers::default());
        let groups = Arc::new(InMemoryGroups::default());
        let messages = Arc::new(InMemoryMessages::default());
        let engine = ChatEngine::new(
            RealtimeConfig::default(),
            messages.clone(),
            groups.clone(),
            users.clone(),
        );
        Self {
            engine,
            users,
            groups,
            messages,
        }
    }

    /// Registers a user with one connection and drains the handshake
    /// presence:sync event.
    async fn connect(
        &self,
        name: &str,
    ) -> (
        UserId,
        Arc<crewchat_realtime::connection::ConnectionHandle>,
        tokio::sync::mpsc::Receiver<ServerEvent>,
    ) {
        let user = self.users.add(name);
        let (handle, rx) = self.connect_user(user, name).await;
        (user, handle, rx)
    }

    /// Opens an additional connection for an existing user.
    async fn connect_user(
        &self,
        user: UserId,
        name: &str,
    ) -> (
        Arc<crewchat_realtime::connection::ConnectionHandle>,
        tokio::sync::mpsc::Receiver<ServerEvent>,
    ) {
        let (handle, mut rx) = self
            .engine
            .connections
            .register(user, uuid::Uuid::new_v4(), name.to_string());
        // Handshake always queues presence:sync first.
        match rx.recv().await.expect("handshake event") {
            ServerEvent::PresenceSync { .. } => {}
            other => panic!("expected presence:sync, got {other:?}"),
        }
        (handle, rx)
    }
}

/// Pulls events until one matches, skipping presence noise from
/// unrelated connects/disconnects.
async fn next_non_presence(rx: &mut tokio::sync::mpsc::Receiver<ServerEvent>) -> ServerEvent {
    loop {
        match rx.recv().await.expect("event") {
            ServerEvent::PresenceUpdate { .. } | ServerEvent::PresenceSync { .. } => continue,
            other => return other,
        }
    }
}

#[tokio::test]
async fn direct_message_reaches_both_sides_with_one_canonical_id() {
    let h = Harness::new();
    let (u1, u1_tab_a, mut rx_a) = h.connect("u1").await;
    let (_u1_tab_b, mut rx_b) = h.connect_user(u1, "u1").await;
    let (u2, _u2_conn, mut rx_u2) = h.connect("u2").await;

    h.engine
        .router
        .handle_event(
            &u1_tab_a,
            ClientEvent::Message {
                to: u2,
                text: "hello".into(),
                client_message_id: Some("c1".into()),
            },
        )
        .await;

    let to_u2 = next_non_presence(&mut rx_u2).await;
    let to_u1_a = next_non_presence(&mut rx_a).await;
    let to_u1_b = next_non_presence(&mut rx_b).await;

    let (msg_u2, msg_a, msg_b) = match (to_u2, to_u1_a, to_u1_b) {
        (
            ServerEvent::Message(m1),
            ServerEvent::Message(m2),
            ServerEvent::Message(m3),
        ) => (m1, m2, m3),
        other => panic!("expected message events, got {other:?}"),
    };

    assert_eq!(msg_u2.id, msg_a.id, "one canonical id for everyone");
    assert_eq!(msg_a.id, msg_b.id, "sender's other tab converges too");
    assert_eq!(msg_u2.body, "hello");
    assert_eq!(msg_u2.client_message_id.as_deref(), Some("c1"));
    assert_eq!(h.messages.direct_count(), 1);
}

#[tokio::test]
async fn self_chat_is_rejected_and_never_persisted() {
    let h = Harness::new();
    let (u1, conn, mut rx) = h.connect("u1").await;

    h.engine
        .router
        .handle_event(
            &conn,
            ClientEvent::Message {
                to: u1,
                text: "talking to myself".into(),
                client_message_id: None,
            },
        )
        .await;

    match next_non_presence(&mut rx).await {
        ServerEvent::Error { code, .. } => assert_eq!(code, "SELF_CHAT_PREVENTED"),
        other => panic!("expected error event, got {other:?}"),
    }
    assert_eq!(h.messages.direct_count(), 0);
}

#[tokio::test]
async fn blank_text_and_unknown_peer_are_rejected_sender_only() {
    let h = Harness::new();
    let (_u1, conn, mut rx) = h.connect("u1").await;
    let (u2, _u2_conn, mut rx_u2) = h.connect("u2").await;

    h.engine
        .router
        .handle_event(
            &conn,
            ClientEvent::Message {
                to: u2,
                text: "   ".into(),
                client_message_id: None,
            },
        )
        .await;
    match next_non_presence(&mut rx).await {
        ServerEvent::Error { code, .. } => assert_eq!(code, "EMPTY_MESSAGE"),
        other => panic!("expected error, got {other:?}"),
    }

    h.engine
        .router
        .handle_event(
            &conn,
            ClientEvent::Message {
                to: UserId::new(),
                text: "anyone there?".into(),
                client_message_id: None,
            },
        )
        .await;
    match next_non_presence(&mut rx).await {
        ServerEvent::Error { code, .. } => assert_eq!(code, "PEER_NOT_FOUND"),
        other => panic!("expected error, got {other:?}"),
    }

    // The peer never sees the failures.
    assert!(rx_u2.try_recv().is_err());
}

#[tokio::test]
async fn malformed_payload_yields_invalid_event() {
    let h = Harness::new();
    let (_u1, conn, mut rx) = h.connect("u1").await;

    h.engine.router.handle_text(&conn, "{not json").await;

    match next_non_presence(&mut rx).await {
        ServerEvent::Error { code, .. } => assert_eq!(code, "INVALID_EVENT"),
        other => panic!("expected error, got {other:?}"),
    }
    assert!(conn.is_alive(), "bad payloads never kill the connection");
}

#[tokio::test]
async fn group_fan_out_matches_membership_at_send_time() {
    let h = Harness::new();
    let (u1, u1_conn, mut rx_u1) = h.connect("u1").await;
    let (u2, _u2_conn, mut rx_u2) = h.connect("u2").await;
    let (u3, _u3_conn, mut rx_u3) = h.connect("u3").await;

    let group = h.groups.seed("g1", u1, &[u2]);

    // u2 is removed before the send, u3 added before the send.
    h.groups.remove(group, u2);
    h.groups.add(group, u3);

    h.engine
        .router
        .handle_event(
            &u1_conn,
            ClientEvent::GroupMessage {
                group_id: group,
                text: "meeting at 3".into(),
                client_message_id: None,
            },
        )
        .await;

    match next_non_presence(&mut rx_u1).await {
        ServerEvent::GroupMessage(m) => assert_eq!(m.body, "meeting at 3"),
        other => panic!("sender's own tabs get the message, got {other:?}"),
    }
    match next_non_presence(&mut rx_u3).await {
        ServerEvent::GroupMessage(m) => assert_eq!(m.group_id, group),
        other => panic!("new member receives, got {other:?}"),
    }
    assert!(rx_u2.try_recv().is_err(), "removed member receives nothing");
}

#[tokio::test]
async fn non_member_cannot_send_to_group() {
    let h = Harness::new();
    let (u1, _u1_conn, _rx_u1) = h.connect("u1").await;
    let (_outsider, conn, mut rx) = h.connect("outsider").await;

    let group = h.groups.seed("g1", u1, &[]);

    h.engine
        .router
        .handle_event(
            &conn,
            ClientEvent::GroupMessage {
                group_id: group,
                text: "let me in".into(),
                client_message_id: None,
            },
        )
        .await;

    match next_non_presence(&mut rx).await {
        ServerEvent::Error { code, .. } => assert_eq!(code, "NOT_A_MEMBER"),
        other => panic!("expected error, got {other:?}"),
    }
    assert_eq!(h.messages.group_count(), 0);
}

#[tokio::test]
async fn group_typing_relays_to_joined_members_excluding_sender() {
    let h = Harness::new();
    let (u1, u1_conn, mut rx_u1) = h.connect("u1").await;
    let (u2, u2_conn, mut rx_u2) = h.connect("u2").await;

    let group = h.groups.seed("g1", u1, &[u2]);

    h.engine
        .router
        .handle_event(&u1_conn, ClientEvent::GroupJoin { group_id: group })
        .await;
    h.engine
        .router
        .handle_event(&u2_conn, ClientEvent::GroupJoin { group_id: group })
        .await;

    h.engine
        .router
        .handle_event(&u1_conn, ClientEvent::GroupTypingStart { group_id: group })
        .await;

    match next_non_presence(&mut rx_u2).await {
        ServerEvent::GroupTypingStart {
            group_id,
            user_id,
            user_name,
        } => {
            assert_eq!(group_id, group);
            assert_eq!(user_id, u1);
            assert_eq!(user_name, "u1");
        }
        other => panic!("expected group typing event, got {other:?}"),
    }
    assert!(rx_u1.try_recv().is_err(), "typist gets no echo");
}

#[tokio::test]
async fn removed_member_is_evicted_from_room_mid_session() {
    let h = Harness::new();
    let (u1, u1_conn, _rx_u1) = h.connect("u1").await;
    let (u2, u2_conn, mut rx_u2) = h.connect("u2").await;

    let group = h.groups.seed("g1", u1, &[u2]);
    h.engine
        .router
        .handle_event(&u2_conn, ClientEvent::GroupJoin { group_id: group })
        .await;

    // Admin removes u2: store mutation plus engine eviction, as the
    // group service does it.
    h.groups.remove(group, u2);
    h.engine.notify_group_removed(&u2, group);

    match next_non_presence(&mut rx_u2).await {
        ServerEvent::GroupRemoved { group_id } => assert_eq!(group_id, group),
        other => panic!("expected group:removed, got {other:?}"),
    }

    // u1 types; evicted u2 must not see it.
    h.engine
        .router
        .handle_event(&u1_conn, ClientEvent::GroupJoin { group_id: group })
        .await;
    h.engine
        .router
        .handle_event(&u1_conn, ClientEvent::GroupTypingStart { group_id: group })
        .await;
    assert!(rx_u2.try_recv().is_err());
}

#[tokio::test]
async fn direct_typing_goes_to_peer_only() {
    let h = Harness::new();
    let (u1, u1_conn, mut rx_u1) = h.connect("u1").await;
    let (u2, _u2_conn, mut rx_u2) = h.connect("u2").await;

    h.engine
        .router
        .handle_event(&u1_conn, ClientEvent::TypingStart { to: u2 })
        .await;

    match next_non_presence(&mut rx_u2).await {
        ServerEvent::TypingStart { from } => assert_eq!(from, u1),
        other => panic!("expected typing:start, got {other:?}"),
    }
    assert!(rx_u1.try_recv().is_err());

    h.engine
        .router
        .handle_event(&u1_conn, ClientEvent::TypingStop { to: u2 })
        .await;
    match next_non_presence(&mut rx_u2).await {
        ServerEvent::TypingStop { from } => assert_eq!(from, u1),
        other => panic!("expected typing:stop, got {other:?}"),
    }
}
