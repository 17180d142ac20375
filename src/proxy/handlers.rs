//! Relay Handlers
//!
//! The relay mediates between client and upstream: look up the cache, forward
//! on a miss, buffer and store the upstream body, respond. With caching
//! disabled it degrades to a streaming pass-through over the same route.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::error::{RelayError, Result};
use crate::proxy::upstream::{strip_hop_by_hop, UpstreamForwarder};
use crate::ratelimit::RateLimiter;

// == Cache Status Header ==
/// Response header reporting whether the body came from the cache.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");
const X_CACHE_HIT: HeaderValue = HeaderValue::from_static("HIT");
const X_CACHE_MISS: HeaderValue = HeaderValue::from_static("MISS");

// == Application State ==
/// Shared state handed to the router at startup.
///
/// The store and limiter are constructed once in `main` and injected here;
/// nothing in the request path owns global state.
#[derive(Clone)]
pub struct AppState {
    /// Response cache; `None` switches the relay to pass-through mode
    pub cache: Option<ResponseCache>,
    /// Per-IP request limiter
    pub limiter: RateLimiter,
    /// Forwarder holding the upstream client and origin
    pub upstream: UpstreamForwarder,
    /// Body returned to throttled clients
    pub rate_limit_message: String,
}

impl AppState {
    /// Creates the application state from configuration.
    ///
    /// Fails when the upstream URL cannot be parsed, aborting startup.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let upstream = UpstreamForwarder::new(&config.upstream_url, config.upstream_timeout)?;

        Ok(Self {
            cache: config
                .cache_enabled
                .then(|| ResponseCache::new(config.cache_ttl)),
            limiter: RateLimiter::new(config.rate_limit_window, config.rate_limit_max),
            upstream,
            rate_limit_message: config.rate_limit_message.clone(),
        })
    }
}

// == Relay Handler ==
/// Handles every inbound request, whatever its method or path.
///
/// The cache key is the raw path+query exactly as received; method and
/// headers deliberately play no part in it.
pub async fn relay_handler(State(state): State<AppState>, request: Request) -> Result<Response> {
    let cache_key = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    match state.cache.clone() {
        Some(cache) => relay_cached(&state, &cache, cache_key, request).await,
        None => relay_passthrough(&state, &cache_key, request).await,
    }
}

// == Cached Path ==
/// lookup → forward-if-miss → buffer → store → respond, in that order.
async fn relay_cached(
    state: &AppState,
    cache: &ResponseCache,
    cache_key: String,
    request: Request,
) -> Result<Response> {
    if let Some(body) = cache.get(&cache_key).await {
        tracing::debug!(key = %cache_key, "cache hit");
        return Ok((StatusCode::OK, [(X_CACHE, X_CACHE_HIT)], body).into_response());
    }

    tracing::debug!(key = %cache_key, "cache miss");
    let (mut parts, body) = request.into_parts();

    // Ask the upstream for an identity-encoded body; the store holds bytes
    // only, so a compressed body would replay without its content-encoding
    parts.headers.remove(header::ACCEPT_ENCODING);

    let request_body = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| RelayError::Internal(format!("failed to read request body: {e}")))?;

    let upstream_response = state
        .upstream
        .forward(
            parts.method,
            &cache_key,
            parts.headers,
            request_body.into(),
        )
        .await?;

    let status = upstream_response.status();
    let mut headers = upstream_response.headers().clone();
    strip_hop_by_hop(&mut headers);
    // The buffered body is re-framed below
    headers.remove(header::CONTENT_LENGTH);

    let body: Bytes = upstream_response.bytes().await?;

    // Transport failures never reach this point; an error body would replay
    // as 200 OK on a hit, so only successful responses are stored
    if status.is_success() {
        cache.insert(cache_key, body.clone()).await;
    }

    headers.insert(X_CACHE, X_CACHE_MISS);
    Ok((status, headers, body).into_response())
}

// == Pass-Through Path ==
/// Pure streaming relay: no cache consultation, no header injection beyond
/// the shared middleware stack.
async fn relay_passthrough(
    state: &AppState,
    path_and_query: &str,
    request: Request,
) -> Result<Response> {
    let (parts, body) = request.into_parts();
    let request_body = reqwest::Body::wrap_stream(body.into_data_stream());

    let upstream_response = state
        .upstream
        .forward(parts.method, path_and_query, parts.headers, request_body)
        .await?;

    let status = upstream_response.status();
    let mut headers = upstream_response.headers().clone();
    strip_hop_by_hop(&mut headers);

    let body = Body::from_stream(upstream_response.bytes_stream());
    Ok((status, headers, body).into_response())
}
