//! Cache Relay - a lightweight caching reverse proxy
//!
//! Forwards every request to a fixed upstream host, optionally serving
//! repeated requests from a short-lived in-memory response cache.

pub mod cache;
pub mod config;
pub mod error;
pub mod proxy;
pub mod ratelimit;
pub mod tasks;

pub use config::Config;
pub use proxy::{create_router, AppState};
pub use tasks::spawn_cleanup_task;
