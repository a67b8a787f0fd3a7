//! Foundation module - Shared domain primitives.
//!
//! Identifiers, authentication types, and error types shared by the
//! realtime core and its admission collaborators.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::ValidationError;
pub use ids::{BoardId, ConnectionId, UserId};
pub use timestamp::Timestamp;
