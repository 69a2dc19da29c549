//! Signaling message dispatch and relay.
//!
//! [`SignalingRouter`] translates each inbound [`ClientMessage`] into a
//! registry operation plus zero or more outbound notifications. It never
//! inspects SDP or ICE payloads; it only decides who receives them.
//! Relay recipients are looked up fresh from the registry at relay time,
//! never cached, so a message is never forwarded to a connection that has
//! already left the room.

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomId, RoomRegistry};
use crate::error::SignalError;
use crate::ws::messages::{ClientMessage, ServerMessage};
use crate::ws::peers::PeerMap;
use crate::ws::session::ConnectionSession;

/// Routes signaling messages between room members.
///
/// Holds the authoritative [`RoomRegistry`] and the [`PeerMap`] used for
/// targeted delivery. One instance is shared by every connection task.
#[derive(Debug, Clone)]
pub struct SignalingRouter {
    registry: Arc<RoomRegistry>,
    peers: PeerMap,
}

impl SignalingRouter {
    /// Creates a router over the given registry and peer map.
    #[must_use]
    pub fn new(registry: Arc<RoomRegistry>, peers: PeerMap) -> Self {
        Self { registry, peers }
    }

    /// Returns the underlying room registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Returns the peer delivery map.
    #[must_use]
    pub fn peers(&self) -> &PeerMap {
        &self.peers
    }

    /// Single entry point for all inbound client messages.
    ///
    /// Threads the connection identity explicitly through every handler;
    /// the session is only touched on successful create/join/leave.
    pub async fn dispatch(&self, session: &mut ConnectionSession, message: ClientMessage) {
        match message {
            ClientMessage::Create { room_id } => self.on_create(session, room_id).await,
            ClientMessage::Join { room_id } => self.on_join(session, room_id).await,
            ClientMessage::Offer { room_id, sdp } => {
                let relayed = ServerMessage::Offer {
                    room_id: room_id.clone(),
                    sdp,
                };
                self.relay(session.connection_id(), &room_id, relayed).await;
            }
            ClientMessage::Answer { room_id, sdp } => {
                let relayed = ServerMessage::Answer {
                    room_id: room_id.clone(),
                    sdp,
                };
                self.relay(session.connection_id(), &room_id, relayed).await;
            }
            ClientMessage::IceCandidate { room_id, candidate } => {
                let relayed = ServerMessage::IceCandidate {
                    room_id: room_id.clone(),
                    candidate,
                };
                self.relay(session.connection_id(), &room_id, relayed).await;
            }
            ClientMessage::Hangup { room_id } => self.on_hangup(session, room_id).await,
        }
    }

    /// Reports an undecodable frame back to its sender.
    pub async fn on_malformed(&self, connection_id: ConnectionId, detail: String) {
        tracing::debug!(%connection_id, %detail, "malformed signaling message");
        let err = SignalError::MalformedMessage(detail);
        let _ = self.peers.send(connection_id, ServerMessage::from(&err)).await;
    }

    /// Handles transport close: removes the connection from any room it
    /// occupies and notifies survivors. Safe to run after a hangup has
    /// already emptied the session.
    pub async fn on_transport_close(&self, session: &mut ConnectionSession) {
        let connection_id = session.connection_id();
        let hint = session.clear();
        self.leave_and_notify(connection_id, hint.as_ref()).await;
        tracing::debug!(%connection_id, "transport closed");
    }

    async fn on_create(&self, session: &mut ConnectionSession, requested: Option<RoomId>) {
        let connection_id = session.connection_id();
        let room_id = requested.unwrap_or_else(RoomId::generate);

        match self.registry.create(room_id.clone(), connection_id).await {
            Ok(()) => {
                if session.current_room().is_some() {
                    // One room per connection: creating a new room vacates
                    // the old one, with survivors notified.
                    let hint = session.clear();
                    self.leave_and_notify(connection_id, hint.as_ref()).await;
                }
                session.enter(room_id.clone());
                tracing::info!(%connection_id, %room_id, "room created");
                let _ = self
                    .peers
                    .send(connection_id, ServerMessage::Created { room_id })
                    .await;
            }
            Err(SignalError::RoomAlreadyExists(room_id)) => {
                // Deliberately no reply and no implicit join: the client
                // is expected to follow up with a join, which keeps the
                // creator as the room's offerer.
                tracing::debug!(%connection_id, %room_id, "create for existing room ignored");
            }
            Err(err) => {
                let _ = self
                    .peers
                    .send(connection_id, ServerMessage::from(&err))
                    .await;
            }
        }
    }

    async fn on_join(&self, session: &mut ConnectionSession, room_id: RoomId) {
        let connection_id = session.connection_id();

        match self.registry.join(&room_id, connection_id).await {
            Ok(existing) => {
                if session.current_room().is_some_and(|r| *r != room_id) {
                    let hint = session.clear();
                    self.leave_and_notify(connection_id, hint.as_ref()).await;
                }
                session.enter(room_id.clone());
                tracing::info!(%connection_id, %room_id, "joined room");

                let _ = self
                    .peers
                    .send(
                        connection_id,
                        ServerMessage::Joined {
                            room_id: room_id.clone(),
                        },
                    )
                    .await;
                for peer in existing {
                    let _ = self
                        .peers
                        .send(peer, ServerMessage::PeerJoined { connection_id })
                        .await;
                }
            }
            Err(err) => {
                tracing::debug!(%connection_id, %room_id, error = %err, "join rejected");
                let _ = self
                    .peers
                    .send(connection_id, ServerMessage::from(&err))
                    .await;
            }
        }
    }

    async fn on_hangup(&self, session: &mut ConnectionSession, room_id: RoomId) {
        let connection_id = session.connection_id();
        let hint = session.clear().unwrap_or(room_id);
        tracing::info!(%connection_id, room_id = %hint, "hangup");
        self.leave_and_notify(connection_id, Some(&hint)).await;
    }

    /// Relays an opaque payload to every other current member of the room.
    ///
    /// Membership is enforced: a relay from a non-member, or into an
    /// unknown room, is answered with an error to the sender only. A
    /// failed delivery to one member never aborts delivery to the rest.
    async fn relay(&self, connection_id: ConnectionId, room_id: &RoomId, message: ServerMessage) {
        match self.registry.relay_targets(room_id, connection_id).await {
            Ok(targets) => {
                for target in targets {
                    let _ = self.peers.send(target, message.clone()).await;
                }
            }
            Err(err) => {
                tracing::debug!(%connection_id, %room_id, error = %err, "relay rejected");
                let _ = self
                    .peers
                    .send(connection_id, ServerMessage::from(&err))
                    .await;
            }
        }
    }

    /// Runs a registry leave and emits `peer-disconnected` to every
    /// survivor of every affected room.
    async fn leave_and_notify(&self, connection_id: ConnectionId, hint: Option<&RoomId>) {
        let departures = self.registry.leave(connection_id, hint).await;
        for departure in departures {
            if departure.remaining.is_empty() {
                tracing::info!(room_id = %departure.room_id, "room deleted");
            }
            for survivor in departure.remaining {
                let _ = self
                    .peers
                    .send(survivor, ServerMessage::PeerDisconnected { connection_id })
                    .await;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use tokio::sync::mpsc;
    use tokio::sync::mpsc::error::TryRecvError;

    use super::*;

    struct Peer {
        session: ConnectionSession,
        rx: mpsc::UnboundedReceiver<ServerMessage>,
    }

    impl Peer {
        fn id(&self) -> ConnectionId {
            self.session.connection_id()
        }

        /// Asserts the peer's queue is empty right now.
        fn assert_silent(&mut self) {
            assert_eq!(self.rx.try_recv().err(), Some(TryRecvError::Empty));
        }

        fn next(&mut self) -> ServerMessage {
            match self.rx.try_recv() {
                Ok(msg) => msg,
                Err(e) => panic!("expected a queued message, got {e:?}"),
            }
        }
    }

    async fn setup() -> (SignalingRouter, Peer, Peer, Peer) {
        let router = SignalingRouter::new(Arc::new(RoomRegistry::new()), PeerMap::new());
        let mut peers = Vec::new();
        for _ in 0..3 {
            let id = ConnectionId::new();
            let (tx, rx) = mpsc::unbounded_channel();
            router.peers().register(id, tx).await;
            peers.push(Peer {
                session: ConnectionSession::new(id),
                rx,
            });
        }
        let Some(c) = peers.pop() else {
            panic!("setup");
        };
        let Some(b) = peers.pop() else {
            panic!("setup");
        };
        let Some(a) = peers.pop() else {
            panic!("setup");
        };
        (router, a, b, c)
    }

    async fn create(router: &SignalingRouter, peer: &mut Peer, room: &str) {
        router
            .dispatch(
                &mut peer.session,
                ClientMessage::Create {
                    room_id: Some(RoomId::new(room)),
                },
            )
            .await;
    }

    async fn join(router: &SignalingRouter, peer: &mut Peer, room: &str) {
        router
            .dispatch(
                &mut peer.session,
                ClientMessage::Join {
                    room_id: RoomId::new(room),
                },
            )
            .await;
    }

    #[tokio::test]
    async fn create_confirms_to_caller_only() {
        let (router, mut a, mut b, mut c) = setup().await;

        create(&router, &mut a, "abc").await;

        assert_eq!(
            a.next(),
            ServerMessage::Created {
                room_id: RoomId::new("abc"),
            }
        );
        assert_eq!(a.session.current_room(), Some(&RoomId::new("abc")));
        b.assert_silent();
        c.assert_silent();
    }

    #[tokio::test]
    async fn create_without_key_generates_one() {
        let (router, mut a, _b, _c) = setup().await;

        router
            .dispatch(&mut a.session, ClientMessage::Create { room_id: None })
            .await;

        let ServerMessage::Created { room_id } = a.next() else {
            panic!("expected created");
        };
        assert!(!room_id.as_str().is_empty());
        assert_eq!(router.registry().members(&room_id).await, Some(vec![a.id()]));
    }

    #[tokio::test]
    async fn create_for_existing_room_is_silently_ignored() {
        let (router, mut a, mut b, _c) = setup().await;

        create(&router, &mut a, "abc").await;
        let _ = a.next();

        // Second create for the same key: no reply, no membership change,
        // no implicit join.
        create(&router, &mut b, "abc").await;

        b.assert_silent();
        a.assert_silent();
        assert!(b.session.current_room().is_none());
        assert_eq!(
            router.registry().members(&RoomId::new("abc")).await,
            Some(vec![a.id()])
        );
    }

    #[tokio::test]
    async fn join_notifies_joiner_and_creator_exactly_once() {
        let (router, mut a, mut b, mut c) = setup().await;

        create(&router, &mut a, "abc").await;
        let _ = a.next();

        join(&router, &mut b, "abc").await;

        assert_eq!(
            b.next(),
            ServerMessage::Joined {
                room_id: RoomId::new("abc"),
            }
        );
        assert_eq!(
            a.next(),
            ServerMessage::PeerJoined {
                connection_id: b.id(),
            }
        );
        a.assert_silent();
        b.assert_silent();
        c.assert_silent();
    }

    #[tokio::test]
    async fn join_unknown_room_errors_caller_only() {
        let (router, mut a, mut b, _c) = setup().await;

        join(&router, &mut b, "ghost").await;

        let ServerMessage::Error { code, .. } = b.next() else {
            panic!("expected error");
        };
        assert_eq!(code, 2001);
        assert!(b.session.current_room().is_none());
        a.assert_silent();
        assert!(router.registry().is_empty().await);
    }

    #[tokio::test]
    async fn join_full_room_errors_caller_only() {
        let (router, mut a, mut b, mut c) = setup().await;

        create(&router, &mut a, "abc").await;
        join(&router, &mut b, "abc").await;
        let _ = a.next();
        let _ = a.next();
        let _ = b.next();

        join(&router, &mut c, "abc").await;

        let ServerMessage::Error { code, .. } = c.next() else {
            panic!("expected error");
        };
        assert_eq!(code, 2003);
        a.assert_silent();
        b.assert_silent();
    }

    #[tokio::test]
    async fn offer_and_answer_relay_verbatim() {
        let (router, mut a, mut b, _c) = setup().await;

        create(&router, &mut a, "abc").await;
        join(&router, &mut b, "abc").await;
        let _ = a.next();
        let _ = a.next();
        let _ = b.next();

        let sdp = serde_json::json!({"type": "offer", "sdp": "v=0"});
        router
            .dispatch(
                &mut b.session,
                ClientMessage::Offer {
                    room_id: RoomId::new("abc"),
                    sdp: sdp.clone(),
                },
            )
            .await;
        assert_eq!(
            a.next(),
            ServerMessage::Offer {
                room_id: RoomId::new("abc"),
                sdp,
            }
        );

        let answer = serde_json::json!({"type": "answer", "sdp": "v=0"});
        router
            .dispatch(
                &mut a.session,
                ClientMessage::Answer {
                    room_id: RoomId::new("abc"),
                    sdp: answer.clone(),
                },
            )
            .await;
        assert_eq!(
            b.next(),
            ServerMessage::Answer {
                room_id: RoomId::new("abc"),
                sdp: answer,
            }
        );
        // The relay never echoes back to the sender.
        a.assert_silent();
        b.assert_silent();
    }

    #[tokio::test]
    async fn ice_after_answer_arrives_in_send_order() {
        let (router, mut a, mut b, _c) = setup().await;

        create(&router, &mut a, "abc").await;
        join(&router, &mut b, "abc").await;
        let _ = a.next();
        let _ = a.next();
        let _ = b.next();

        router
            .dispatch(
                &mut a.session,
                ClientMessage::Answer {
                    room_id: RoomId::new("abc"),
                    sdp: serde_json::json!("answer"),
                },
            )
            .await;
        router
            .dispatch(
                &mut a.session,
                ClientMessage::IceCandidate {
                    room_id: RoomId::new("abc"),
                    candidate: serde_json::json!({"candidate": "late"}),
                },
            )
            .await;

        assert!(matches!(b.next(), ServerMessage::Answer { .. }));
        assert!(matches!(b.next(), ServerMessage::IceCandidate { .. }));
    }

    #[tokio::test]
    async fn relay_from_non_member_is_rejected() {
        let (router, mut a, mut b, mut c) = setup().await;

        create(&router, &mut a, "abc").await;
        join(&router, &mut b, "abc").await;
        let _ = a.next();
        let _ = a.next();
        let _ = b.next();

        router
            .dispatch(
                &mut c.session,
                ClientMessage::Offer {
                    room_id: RoomId::new("abc"),
                    sdp: serde_json::json!("intruder"),
                },
            )
            .await;

        let ServerMessage::Error { code, .. } = c.next() else {
            panic!("expected error");
        };
        assert_eq!(code, 1002);
        a.assert_silent();
        b.assert_silent();
    }

    #[tokio::test]
    async fn relay_into_unknown_room_is_rejected() {
        let (router, mut a, _b, _c) = setup().await;

        router
            .dispatch(
                &mut a.session,
                ClientMessage::IceCandidate {
                    room_id: RoomId::new("ghost"),
                    candidate: serde_json::json!({}),
                },
            )
            .await;

        let ServerMessage::Error { code, .. } = a.next() else {
            panic!("expected error");
        };
        assert_eq!(code, 2001);
    }

    #[tokio::test]
    async fn hangup_notifies_survivor_once_and_is_idempotent() {
        let (router, mut a, mut b, _c) = setup().await;

        create(&router, &mut a, "abc").await;
        join(&router, &mut b, "abc").await;
        let _ = a.next();
        let _ = a.next();
        let _ = b.next();

        router
            .dispatch(
                &mut a.session,
                ClientMessage::Hangup {
                    room_id: RoomId::new("abc"),
                },
            )
            .await;

        assert_eq!(
            b.next(),
            ServerMessage::PeerDisconnected {
                connection_id: a.id(),
            }
        );
        assert!(a.session.current_room().is_none());
        assert_eq!(
            router.registry().members(&RoomId::new("abc")).await,
            Some(vec![b.id()])
        );

        // Second hangup for the same connection is a no-op.
        router
            .dispatch(
                &mut a.session,
                ClientMessage::Hangup {
                    room_id: RoomId::new("abc"),
                },
            )
            .await;
        b.assert_silent();
        a.assert_silent();
    }

    #[tokio::test]
    async fn transport_close_after_hangup_is_a_noop() {
        let (router, mut a, mut b, _c) = setup().await;

        create(&router, &mut a, "abc").await;
        join(&router, &mut b, "abc").await;
        let _ = a.next();
        let _ = a.next();
        let _ = b.next();

        router
            .dispatch(
                &mut a.session,
                ClientMessage::Hangup {
                    room_id: RoomId::new("abc"),
                },
            )
            .await;
        let _ = b.next();

        // Hangup then transport close: exactly one peer-disconnected.
        router.on_transport_close(&mut a.session).await;
        b.assert_silent();
    }

    #[tokio::test]
    async fn closing_the_last_member_deletes_the_room() {
        let (router, mut a, _b, _c) = setup().await;

        create(&router, &mut a, "abc").await;
        let _ = a.next();

        router.on_transport_close(&mut a.session).await;
        assert!(router.registry().is_empty().await);
    }

    #[tokio::test]
    async fn creating_a_second_room_vacates_the_first() {
        let (router, mut a, mut b, _c) = setup().await;

        create(&router, &mut a, "first").await;
        join(&router, &mut b, "first").await;
        let _ = a.next();
        let _ = a.next();
        let _ = b.next();

        create(&router, &mut a, "second").await;

        assert_eq!(
            b.next(),
            ServerMessage::PeerDisconnected {
                connection_id: a.id(),
            }
        );
        assert_eq!(
            a.next(),
            ServerMessage::Created {
                room_id: RoomId::new("second"),
            }
        );
        assert_eq!(
            router.registry().members(&RoomId::new("first")).await,
            Some(vec![b.id()])
        );
        assert_eq!(
            router.registry().members(&RoomId::new("second")).await,
            Some(vec![a.id()])
        );
    }

    #[tokio::test]
    async fn dead_peer_does_not_abort_delivery_to_survivors() {
        let (router, mut a, mut b, _c) = setup().await;

        create(&router, &mut a, "abc").await;
        join(&router, &mut b, "abc").await;
        let _ = a.next();
        let _ = a.next();
        let _ = b.next();

        // Simulate b's writer task dying without a registry leave.
        router.peers().unregister(b.id()).await;

        router
            .dispatch(
                &mut a.session,
                ClientMessage::Offer {
                    room_id: RoomId::new("abc"),
                    sdp: serde_json::json!("v=0"),
                },
            )
            .await;

        // The failed send is swallowed; the registry stays usable.
        a.assert_silent();
        assert_eq!(
            router.registry().members(&RoomId::new("abc")).await.map(|m| m.len()),
            Some(2)
        );
    }
}
