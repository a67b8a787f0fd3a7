//! Board access adapters.
//!
//! Implementations of the `BoardAccessChecker` port:
//!
//! - `http` - Asks the board service's internal membership endpoint
//! - `memory` - Fixed grants, for tests and single-node demos

mod http;
mod memory;

pub use http::{AccessClientError, HttpBoardAccessChecker};
pub use memory::InMemoryBoardAccess;
