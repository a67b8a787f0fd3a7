//! Realtime domain types.
//!
//! A [`Message`] is published to exactly one [`RoomId`]. Board rooms and
//! personal user rooms share a single string keyspace, told apart by the
//! `user:` prefix.

pub mod event_kinds;
mod message;
mod room;

pub use message::{Message, WireMessage};
pub use room::{RoomId, USER_ROOM_PREFIX};
