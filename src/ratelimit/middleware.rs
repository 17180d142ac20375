//! Rate Limit Middleware
//!
//! Rejects over-quota clients before the relay touches the cache or the
//! upstream.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::{RelayError, Result};
use crate::proxy::AppState;

/// Checks the client's quota and either passes the request through or
/// responds with the configured throttling message.
pub async fn rate_limit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response> {
    if !state.limiter.check(addr.ip()).await {
        tracing::warn!(client = %addr.ip(), "rate limit exceeded");
        return Err(RelayError::RateLimited(state.rate_limit_message.clone()));
    }

    Ok(next.run(request).await)
}
