//! WebSocket adapters for real-time board updates.
//!
//! Pushes events from request-handling code to every live connection
//! subscribed to the affected room.
//!
//! # Architecture
//!
//! ```text
//!   handlers / internal API
//!            │ publish (never blocks)
//!            ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         Hub control loop                          │
//! │   owns rooms: RoomId → {ConnectionId}                             │
//! │   owns connections: ConnectionId → outbound queue                 │
//! └──────────────────────────────────────────────────────────────────┘
//!            │ try_send into bounded per-connection queues
//!            ▼
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ write pump    │   │ write pump    │   │ write pump    │
//! │ read pump     │   │ read pump     │   │ read pump     │
//! └───────────────┘   └───────────────┘   └───────────────┘
//! ```
//!
//! # Components
//!
//! - [`hub`] - Registry and control loop
//! - [`connection`] - Per-connection write and read pumps
//! - [`handler`] - Axum admission handler for `GET /ws`

pub mod connection;
pub mod handler;
pub mod hub;

pub use connection::{Connection, ConnectionSettings, ReadOutcome, WriteOutcome};
pub use handler::{
    admit, websocket_router, ws_handler, Admission, AdmissionError, WebSocketState,
    WsConnectParams,
};
pub use hub::{Hub, HubHandle, HubSettings, RegistrySnapshot, SlowConsumerPolicy, Subscriber};
