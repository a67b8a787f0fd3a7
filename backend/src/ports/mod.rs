//! Ports - Interfaces between the realtime core and the outside world.
//!
//! Following hexagonal architecture, ports define the contracts; adapters
//! implement them.
//!
//! ## Admission Ports
//!
//! - `SessionValidator` - Validates connection tokens
//! - `BoardAccessChecker` - Decides whether a user may join a board room
//!
//! ## Publish Port
//!
//! - `RealtimePublisher` - Fire-and-forget fan-out used by request handlers

mod board_access;
mod realtime_publisher;
mod session_validator;

pub use board_access::{BoardAccess, BoardAccessChecker};
pub use realtime_publisher::RealtimePublisher;
pub use session_validator::SessionValidator;
