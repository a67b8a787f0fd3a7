//! HTTP adapter for the internal publish API.
//!
//! Lets the board service, running in another process, push events into the
//! hub and inspect its registry:
//! - `POST /internal/rooms/:room/events` - Publish to a room
//! - `POST /internal/users/:user_id/events` - Publish to a user's personal room
//! - `GET /internal/stats` - Registry snapshot
//!
//! Every route requires the internal bearer token.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::InternalAppState;
pub use routes::internal_router;
