//! Domain layer containing the realtime vocabulary.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, auth types, errors)
//! - `realtime` - Rooms, broadcast messages, and the wire shape

pub mod foundation;
pub mod realtime;
