//! Nexus Realtime - room-based fan-out for the Nexus project board
//!
//! Pushes board and notification events to every live WebSocket connection
//! subscribed to the affected room. Request-handling code publishes through
//! the `RealtimePublisher` port; the hub's control loop owns all routing state.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
