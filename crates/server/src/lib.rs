//! Shopchat Server
//!
//! HTTP endpoints for chat sessions, the product catalog and health
//! probes.

pub mod http;
pub mod state;

pub use http::create_router;
pub use state::AppState;
