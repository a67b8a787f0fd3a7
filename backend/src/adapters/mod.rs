//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the realtime core to external systems:
//! - `access` - Board membership checks (board service HTTP, in-memory)
//! - `auth` - Session token validation (HS256 JWT, mock)
//! - `http` - axum router, internal publish API, middleware
//! - `websocket` - Hub, connection pumps, admission handler

pub mod access;
pub mod auth;
pub mod http;
pub mod websocket;
