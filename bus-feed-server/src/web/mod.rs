//! Web layer for the bus feed proxy.
//!
//! Provides the caller-facing read endpoint plus health and cache status.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
