//! Rate Limiting Module
//!
//! Per-IP fixed-window request limiting applied ahead of the relay.

mod limiter;
mod middleware;

// Re-export public types
pub use limiter::RateLimiter;
pub use middleware::rate_limit;
