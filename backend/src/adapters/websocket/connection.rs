//! One live client session bridged onto the hub.
//!
//! A [`Connection`] owns the consumer end of its outbound queue and runs two
//! pumps over the split transport:
//!
//! - the **outbound pump** drains the queue onto the socket as text frames
//!   and sends keep-alive pings;
//! - the **inbound pump** reads frames only to notice that the peer is gone.
//!   Clients never send application data over this channel.
//!
//! Either pump ending unregisters the connection. Unregistration closes the
//! outbound queue, so the outbound pump flushes what is left, sends a close
//! frame, and exits.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures::{Sink, SinkExt, Stream, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::domain::foundation::{ConnectionId, UserId};
use crate::domain::realtime::{Message, RoomId};

use super::hub::{HubHandle, Subscriber};

/// Per-connection transport tuning.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// Outbound queue capacity. A full queue marks the client as slow.
    pub send_buffer: usize,

    /// Time allowed for a single frame write.
    pub write_timeout: Duration,

    /// Time allowed between frames from the peer before it is considered dead.
    pub pong_timeout: Duration,

    /// Interval between keep-alive pings. Must be shorter than `pong_timeout`.
    pub ping_interval: Duration,

    /// How long the outbound pump may keep flushing after the peer went away.
    pub drain_grace: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            send_buffer: 256,
            write_timeout: Duration::from_secs(10),
            pong_timeout: Duration::from_secs(60),
            ping_interval: Duration::from_secs(54),
            drain_grace: Duration::from_secs(5),
        }
    }
}

/// Why the outbound pump stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The hub closed the queue and everything in it was written.
    QueueClosed,
    /// Writing to the peer failed or timed out.
    Failed(String),
}

/// Why the inbound pump stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The peer sent a close frame.
    PeerClosed,
    /// The stream ended without a close frame.
    StreamEnded,
    /// Reading failed.
    ReadError,
    /// Nothing arrived within the pong timeout.
    LivenessTimeout,
}

#[derive(Debug, Error)]
enum WriteError {
    #[error("write failed: {0}")]
    Transport(String),

    #[error("write timed out after {0:?}")]
    Timeout(Duration),
}

/// A registered client session.
pub struct Connection {
    id: ConnectionId,
    user_id: UserId,
    rooms: Arc<[RoomId]>,
    outbound: mpsc::Receiver<Arc<Message>>,
    hub: HubHandle,
    settings: ConnectionSettings,
}

impl Connection {
    /// Create the outbound queue and register the connection in `rooms`.
    ///
    /// `rooms` must already be authorized; the hub does no checks of its own.
    pub fn open(
        hub: HubHandle,
        user_id: UserId,
        rooms: Vec<RoomId>,
        settings: ConnectionSettings,
    ) -> Self {
        let id = ConnectionId::new();
        let rooms: Arc<[RoomId]> = rooms.into();
        let (outbound_tx, outbound) = mpsc::channel(settings.send_buffer.max(1));

        hub.register(Subscriber::new(
            id,
            user_id.clone(),
            Arc::clone(&rooms),
            outbound_tx,
        ));

        Self {
            id,
            user_id,
            rooms,
            outbound,
            hub,
            settings,
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

    /// Run both pumps over an upgraded WebSocket until the session ends.
    pub async fn serve(self, socket: WebSocket) {
        let (sink, stream) = socket.split();
        self.serve_split(sink, stream).await;
    }

    /// Run both pumps over an already split transport.
    pub async fn serve_split<W, R, E>(self, sink: W, stream: R)
    where
        W: Sink<WsMessage> + Unpin + Send + 'static,
        W::Error: Display + Send,
        R: Stream<Item = Result<WsMessage, E>> + Unpin + Send + 'static,
        E: Display + Send + 'static,
    {
        let Connection {
            id,
            user_id,
            outbound,
            hub,
            settings,
            ..
        } = self;

        let mut write_task = tokio::spawn(write_pump(
            sink,
            outbound,
            hub.clone(),
            id,
            settings.clone(),
        ));
        let mut read_task = tokio::spawn(read_pump(
            stream,
            hub.clone(),
            id,
            settings.pong_timeout,
        ));

        tokio::select! {
            outcome = &mut write_task => {
                read_task.abort();
                tracing::debug!(connection_id = %id, ?outcome, "Outbound pump finished");
            }
            outcome = &mut read_task => {
                tracing::debug!(connection_id = %id, ?outcome, "Inbound pump finished");
                if time::timeout(settings.drain_grace, &mut write_task).await.is_err() {
                    tracing::warn!(
                        connection_id = %id,
                        grace = ?settings.drain_grace,
                        "Outbound pump did not drain in time, aborting"
                    );
                    write_task.abort();
                }
            }
        }

        // Covers a pump that was aborted or panicked before unregistering.
        hub.unregister(id);
        tracing::info!(connection_id = %id, user_id = %user_id, "Connection closed");
    }
}

/// Drain the outbound queue onto the transport.
async fn write_pump<W>(
    mut sink: W,
    mut outbound: mpsc::Receiver<Arc<Message>>,
    hub: HubHandle,
    id: ConnectionId,
    settings: ConnectionSettings,
) -> WriteOutcome
where
    W: Sink<WsMessage> + Unpin,
    W::Error: Display,
{
    let mut ping = time::interval_at(
        Instant::now() + settings.ping_interval,
        settings.ping_interval,
    );
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let frame = tokio::select! {
            next = outbound.recv() => match next {
                Some(message) => match message.to_wire_json() {
                    Ok(text) => WsMessage::Text(text),
                    Err(e) => {
                        tracing::error!(
                            connection_id = %id,
                            kind = message.kind(),
                            error = %e,
                            "Failed to serialize message, skipping"
                        );
                        continue;
                    }
                },
                None => {
                    // Best effort: the peer may already be gone.
                    let _ = write_frame(&mut sink, WsMessage::Close(None), settings.write_timeout).await;
                    return WriteOutcome::QueueClosed;
                }
            },
            _ = ping.tick() => WsMessage::Ping(Vec::new()),
        };

        if let Err(e) = write_frame(&mut sink, frame, settings.write_timeout).await {
            tracing::debug!(connection_id = %id, error = %e, "Send error, closing connection");
            hub.unregister(id);
            return WriteOutcome::Failed(e.to_string());
        }
    }
}

async fn write_frame<W>(sink: &mut W, frame: WsMessage, limit: Duration) -> Result<(), WriteError>
where
    W: Sink<WsMessage> + Unpin,
    W::Error: Display,
{
    match time::timeout(limit, sink.send(frame)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(WriteError::Transport(e.to_string())),
        Err(_) => Err(WriteError::Timeout(limit)),
    }
}

/// Read frames until the peer goes away, then unregister.
async fn read_pump<R, E>(
    mut stream: R,
    hub: HubHandle,
    id: ConnectionId,
    pong_timeout: Duration,
) -> ReadOutcome
where
    R: Stream<Item = Result<WsMessage, E>> + Unpin,
    E: Display,
{
    let outcome = loop {
        match time::timeout(pong_timeout, stream.next()).await {
            Err(_) => break ReadOutcome::LivenessTimeout,
            Ok(None) => break ReadOutcome::StreamEnded,
            Ok(Some(Err(e))) => {
                tracing::debug!(connection_id = %id, error = %e, "Receive error");
                break ReadOutcome::ReadError;
            }
            Ok(Some(Ok(WsMessage::Close(_)))) => break ReadOutcome::PeerClosed,
            Ok(Some(Ok(WsMessage::Pong(_)))) => {
                tracing::trace!(connection_id = %id, "Received pong");
            }
            // Pings are answered by the WebSocket layer.
            Ok(Some(Ok(WsMessage::Ping(_)))) => {}
            Ok(Some(Ok(_))) => {
                tracing::trace!(connection_id = %id, "Ignoring client data frame");
            }
        }
    };

    tracing::debug!(connection_id = %id, ?outcome, "Peer gone");
    hub.unregister(id);
    outcome
}
