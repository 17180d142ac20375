//! Proxy Module
//!
//! The relay: router assembly, request handling and upstream forwarding.

pub mod handlers;
pub mod routes;
pub mod upstream;

pub use handlers::{relay_handler, AppState, X_CACHE};
pub use routes::create_router;
pub use upstream::UpstreamForwarder;
