//! Room registry and fan-out control loop.
//!
//! The [`Hub`] exclusively owns the mapping from room to subscribed
//! connections. Every read and write of that mapping happens on the single
//! task running [`Hub::run`]; everyone else talks to it through a cloneable
//! [`HubHandle`] that only sends on channels.
//!
//! # Architecture
//!
//! ```text
//!  admission ──register──┐
//!  pumps ─────unregister─┤          ┌──────────────── Hub::run ───────────────┐
//!  handlers ──publish────┼────────▶ │ rooms: RoomId → {ConnectionId}          │
//!  stats ─────snapshot───┘          │ connections: ConnectionId → Subscriber  │
//!                                   └────────────┬────────────────────────────┘
//!                                                │ try_send (never blocks)
//!                                   ┌────────────┼────────────┐
//!                                   ▼            ▼            ▼
//!                               outbound      outbound     outbound
//!                               queue #1      queue #2     queue #3
//! ```
//!
//! # Ordering
//!
//! The loop polls its inputs in a fixed priority (register, unregister,
//! publish, query). Pending membership changes are applied before pending
//! publishes, so a publish issued after `register` reaches the new connection
//! and a publish issued after `unregister` never does. Membership is judged
//! at the moment the loop handles the publish. Messages to one room are
//! delivered in the order the loop receives them; there is no ordering
//! across rooms.
//!
//! The price of that priority is latency under churn: a sustained burst of
//! registrations or unregistrations holds back publishes until it subsides.
//!
//! # Slow consumers
//!
//! A subscriber whose outbound queue is full is evicted by default, which
//! closes its queue and ends its connection. [`SlowConsumerPolicy::DropMessage`]
//! keeps the subscriber and drops only the message it could not take.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::domain::foundation::{ConnectionId, Timestamp, UserId};
use crate::domain::realtime::{Message, RoomId};
use crate::ports::RealtimePublisher;

/// What the hub does when a subscriber's outbound queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlowConsumerPolicy {
    /// Remove the subscriber from every room and close its queue.
    #[default]
    Evict,
    /// Keep the subscriber and drop the message it could not accept.
    DropMessage,
}

/// Tuning for the control loop.
#[derive(Debug, Clone)]
pub struct HubSettings {
    /// Capacity of the publish ingress. Publishes beyond it are dropped.
    pub publish_buffer: usize,

    /// Overflow handling for full outbound queues.
    pub slow_consumer_policy: SlowConsumerPolicy,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            publish_buffer: 1024,
            slow_consumer_policy: SlowConsumerPolicy::Evict,
        }
    }
}

/// The hub-side half of a connection.
///
/// Holds the producer end of the connection's outbound queue. The queue
/// closes when the last `Subscriber` for it is dropped, which the hub does
/// when the connection is unregistered or evicted.
#[derive(Debug, Clone)]
pub struct Subscriber {
    id: ConnectionId,
    user_id: UserId,
    rooms: Arc<[RoomId]>,
    outbound: mpsc::Sender<Arc<Message>>,
    connected_at: Timestamp,
}

impl Subscriber {
    pub fn new(
        id: ConnectionId,
        user_id: UserId,
        rooms: Arc<[RoomId]>,
        outbound: mpsc::Sender<Arc<Message>>,
    ) -> Self {
        Self {
            id,
            user_id,
            rooms,
            outbound,
            connected_at: Timestamp::now(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn rooms(&self) -> &[RoomId] {
        &self.rooms
    }
}

/// Point-in-time copy of the registry, produced by the control loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrySnapshot {
    /// Every non-empty room and its subscribers.
    pub rooms: BTreeMap<RoomId, BTreeSet<ConnectionId>>,

    /// Number of registered connections.
    pub connections: usize,
}

impl RegistrySnapshot {
    /// Subscribers of `room`, or `None` if the room has no entry.
    pub fn room(&self, room: &RoomId) -> Option<&BTreeSet<ConnectionId>> {
        self.rooms.get(room)
    }

    pub fn contains_room(&self, room: &RoomId) -> bool {
        self.rooms.contains_key(room)
    }

    /// Number of subscribers in `room` (0 if absent).
    pub fn subscriber_count(&self, room: &RoomId) -> usize {
        self.rooms.get(room).map(BTreeSet::len).unwrap_or(0)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

/// The control loop and the registry it owns.
///
/// Construct with [`Hub::new`] and drive with [`Hub::run`], or use
/// [`Hub::spawn`] to do both.
pub struct Hub {
    connections: HashMap<ConnectionId, Subscriber>,
    rooms: HashMap<RoomId, HashSet<ConnectionId>>,
    register_rx: mpsc::UnboundedReceiver<Subscriber>,
    unregister_rx: mpsc::UnboundedReceiver<ConnectionId>,
    publish_rx: mpsc::Receiver<Message>,
    query_rx: mpsc::UnboundedReceiver<oneshot::Sender<RegistrySnapshot>>,
    slow_consumer_policy: SlowConsumerPolicy,
}

impl Hub {
    /// Create a hub and the handle used to talk to it.
    pub fn new(settings: HubSettings) -> (Self, HubHandle) {
        let (register_tx, register_rx) = mpsc::unbounded_channel();
        let (unregister_tx, unregister_rx) = mpsc::unbounded_channel();
        let (publish_tx, publish_rx) = mpsc::channel(settings.publish_buffer.max(1));
        let (query_tx, query_rx) = mpsc::unbounded_channel();

        let hub = Self {
            connections: HashMap::new(),
            rooms: HashMap::new(),
            register_rx,
            unregister_rx,
            publish_rx,
            query_rx,
            slow_consumer_policy: settings.slow_consumer_policy,
        };
        let handle = HubHandle {
            register_tx,
            unregister_tx,
            publish_tx,
            query_tx,
        };

        (hub, handle)
    }

    /// Create a hub and run its control loop on a new task.
    pub fn spawn(settings: HubSettings) -> (HubHandle, JoinHandle<()>) {
        let (hub, handle) = Self::new(settings);
        (handle, tokio::spawn(hub.run()))
    }

    /// Run the control loop until every [`HubHandle`] has been dropped.
    pub async fn run(mut self) {
        tracing::info!(policy = ?self.slow_consumer_policy, "Realtime hub started");

        loop {
            tokio::select! {
                biased;

                Some(subscriber) = self.register_rx.recv() => self.register(subscriber),
                Some(id) = self.unregister_rx.recv() => self.unregister(id),
                Some(message) = self.publish_rx.recv() => self.publish(message),
                Some(reply) = self.query_rx.recv() => {
                    // The asker may have given up waiting.
                    let _ = reply.send(self.snapshot());
                }
                else => break,
            }
        }

        tracing::info!(
            connections = self.connections.len(),
            "Realtime hub stopped"
        );
    }

    fn register(&mut self, subscriber: Subscriber) {
        let id = subscriber.id();

        if self.connections.contains_key(&id) {
            tracing::debug!(connection_id = %id, "Connection already registered");
            return;
        }

        for room in subscriber.rooms().iter() {
            self.rooms.entry(room.clone()).or_default().insert(id);
        }

        tracing::info!(
            connection_id = %id,
            user_id = %subscriber.user_id(),
            rooms = subscriber.rooms().len(),
            "Connection registered"
        );
        self.connections.insert(id, subscriber);
    }

    fn unregister(&mut self, id: ConnectionId) {
        if let Some(subscriber) = self.remove(id) {
            let connected_for = Timestamp::now().duration_since(&subscriber.connected_at);
            tracing::info!(
                connection_id = %id,
                user_id = %subscriber.user_id(),
                connected_secs = connected_for.num_seconds(),
                "Connection unregistered"
            );
        }
    }

    /// Remove a connection from every room it belongs to, pruning rooms that
    /// become empty. Dropping the returned subscriber closes its queue.
    fn remove(&mut self, id: ConnectionId) -> Option<Subscriber> {
        let subscriber = self.connections.remove(&id)?;

        for room in subscriber.rooms().iter() {
            if let Some(members) = self.rooms.get_mut(room) {
                members.remove(&id);
                if members.is_empty() {
                    self.rooms.remove(room);
                }
            }
        }

        Some(subscriber)
    }

    fn publish(&mut self, message: Message) {
        let Some(members) = self.rooms.get(message.room()) else {
            tracing::debug!(room = %message.room(), kind = message.kind(), "No subscribers for room");
            return;
        };

        let message = Arc::new(message);
        let mut evicted = Vec::new();

        for id in members {
            let Some(subscriber) = self.connections.get(id) else {
                continue;
            };

            match subscriber.outbound.try_send(Arc::clone(&message)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => match self.slow_consumer_policy {
                    SlowConsumerPolicy::Evict => {
                        tracing::warn!(
                            connection_id = %id,
                            user_id = %subscriber.user_id(),
                            room = %message.room(),
                            "Outbound queue full, evicting slow consumer"
                        );
                        evicted.push(*id);
                    }
                    SlowConsumerPolicy::DropMessage => {
                        tracing::warn!(
                            connection_id = %id,
                            user_id = %subscriber.user_id(),
                            room = %message.room(),
                            kind = message.kind(),
                            "Outbound queue full, dropping message"
                        );
                    }
                },
                // Consumer is already gone; its unregistration is in flight.
                Err(TrySendError::Closed(_)) => evicted.push(*id),
            }
        }

        for id in evicted {
            self.remove(id);
        }
    }

    fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            rooms: self
                .rooms
                .iter()
                .map(|(room, members)| (room.clone(), members.iter().copied().collect()))
                .collect(),
            connections: self.connections.len(),
        }
    }
}

/// Cloneable, thread-safe front door to the hub.
///
/// All operations except [`HubHandle::snapshot`] are synchronous and never
/// wait on the control loop or on any subscriber.
#[derive(Debug, Clone)]
pub struct HubHandle {
    register_tx: mpsc::UnboundedSender<Subscriber>,
    unregister_tx: mpsc::UnboundedSender<ConnectionId>,
    publish_tx: mpsc::Sender<Message>,
    query_tx: mpsc::UnboundedSender<oneshot::Sender<RegistrySnapshot>>,
}

impl HubHandle {
    /// Add a connection to each of its rooms.
    ///
    /// If the hub is not running the subscriber is dropped, which closes the
    /// connection's outbound queue right away.
    pub fn register(&self, subscriber: Subscriber) {
        if let Err(rejected) = self.register_tx.send(subscriber) {
            tracing::debug!(
                connection_id = %rejected.0.id,
                "Hub not running, registration dropped"
            );
        }
    }

    /// Remove a connection from every room and close its outbound queue.
    ///
    /// Idempotent; unknown ids are ignored.
    pub fn unregister(&self, id: ConnectionId) {
        if self.unregister_tx.send(id).is_err() {
            tracing::debug!(connection_id = %id, "Hub not running, unregistration dropped");
        }
    }

    /// Publish an event to every subscriber of `room`.
    ///
    /// Never blocks. If the ingress buffer is full the message is dropped and
    /// a warning is logged; if the hub is gone the call is a no-op.
    pub fn publish(&self, room: RoomId, kind: impl Into<String>, payload: serde_json::Value) {
        match self.publish_tx.try_send(Message::new(room, kind, payload)) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                tracing::warn!(
                    room = %message.room(),
                    kind = message.kind(),
                    "Publish buffer full, dropping message"
                );
            }
            Err(TrySendError::Closed(message)) => {
                tracing::debug!(
                    room = %message.room(),
                    kind = message.kind(),
                    "Hub not running, dropping message"
                );
            }
        }
    }

    /// Publish an event to the personal room of `user_id`.
    pub fn publish_to_user(
        &self,
        user_id: &UserId,
        kind: impl Into<String>,
        payload: serde_json::Value,
    ) {
        self.publish(RoomId::user(user_id), kind, payload);
    }

    /// Ask the control loop for a copy of the registry.
    ///
    /// Returns `None` if the hub has stopped.
    pub async fn snapshot(&self) -> Option<RegistrySnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.query_tx.send(reply_tx).ok()?;
        reply_rx.await.ok()
    }

    /// True once the control loop has exited.
    pub fn is_closed(&self) -> bool {
        self.publish_tx.is_closed()
    }
}

impl RealtimePublisher for HubHandle {
    fn publish_to_room(&self, room: &RoomId, kind: &str, payload: serde_json::Value) {
        self.publish(room.clone(), kind, payload);
    }

    fn publish_to_user(&self, user_id: &UserId, kind: &str, payload: serde_json::Value) {
        HubHandle::publish_to_user(self, user_id, kind, payload);
    }
}
