//! Router Assembly
//!
//! Wires the relay handler and the middleware stack into an Axum router.

use axum::{
    http::{header, HeaderValue},
    middleware,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use super::handlers::{relay_handler, AppState};
use crate::ratelimit::rate_limit;

/// Creates the router: a single fallback relay plus the middleware stack.
///
/// No routes are registered — any path this service claimed for itself would
/// shadow the upstream's path space, so every request falls through to the
/// relay.
///
/// # Middleware
/// - Tracing: logs all requests
/// - CORS: allows any origin
/// - Security headers on every response, throttled ones included
/// - Rate limiting ahead of the relay
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .fallback(relay_handler)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
