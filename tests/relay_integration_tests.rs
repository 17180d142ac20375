//! Integration Tests for the Relay
//!
//! Runs the real router against a loopback stub upstream and drives it with
//! an HTTP client, covering the full hit/miss, expiry, pass-through, rate
//! limit and failure behavior.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::header,
    response::{IntoResponse, Response},
    Router,
};
use cache_relay::{create_router, AppState, Config};

// == Helper Functions ==

/// Stub upstream: counts requests, echoes bodies on `/echo`, reports the
/// received Host header on `/host`, answers "hello" everywhere else.
async fn upstream_handler(State(hits): State<Arc<AtomicUsize>>, request: Request) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);

    match request.uri().path() {
        "/host" => request
            .headers()
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
            .into_response(),
        "/echo" => {
            let body = axum::body::to_bytes(request.into_body(), usize::MAX)
                .await
                .unwrap();
            body.into_response()
        }
        _ => "hello".into_response(),
    }
}

async fn spawn_upstream() -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .fallback(upstream_handler)
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, hits)
}

async fn spawn_relay(config: Config) -> SocketAddr {
    let state = AppState::from_config(&config).unwrap();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    addr
}

fn test_config(upstream: SocketAddr) -> Config {
    Config {
        upstream_url: format!("http://{upstream}"),
        upstream_timeout: 5,
        ..Config::default()
    }
}

/// An address nothing listens on (bound, then immediately released).
async fn dead_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

// == Cache Behavior ==

#[tokio::test]
async fn test_miss_then_hit_serves_identical_bytes() {
    let (upstream, hits) = spawn_upstream().await;
    let relay = spawn_relay(test_config(upstream)).await;
    let client = reqwest::Client::new();

    let first = client
        .get(format!("http://{relay}/foo?x=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), reqwest::StatusCode::OK);
    assert_eq!(first.headers().get("x-cache").unwrap(), "MISS");
    let first_body = first.bytes().await.unwrap();
    assert_eq!(first_body.as_ref(), b"hello");

    let second = client
        .get(format!("http://{relay}/foo?x=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), reqwest::StatusCode::OK);
    assert_eq!(second.headers().get("x-cache").unwrap(), "HIT");
    assert_eq!(second.bytes().await.unwrap(), first_body);

    assert_eq!(
        hits.load(Ordering::SeqCst),
        1,
        "Upstream must not be contacted on a hit"
    );
}

#[tokio::test]
async fn test_ttl_expiry_triggers_fresh_fetch() {
    let (upstream, hits) = spawn_upstream().await;
    let config = Config {
        cache_ttl: 1,
        ..test_config(upstream)
    };
    let relay = spawn_relay(config).await;
    let client = reqwest::Client::new();

    let first = client
        .get(format!("http://{relay}/foo"))
        .send()
        .await
        .unwrap();
    assert_eq!(first.headers().get("x-cache").unwrap(), "MISS");

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let after_expiry = client
        .get(format!("http://{relay}/foo"))
        .send()
        .await
        .unwrap();
    assert_eq!(after_expiry.headers().get("x-cache").unwrap(), "MISS");
    assert_eq!(
        hits.load(Ordering::SeqCst),
        2,
        "Expiry must trigger a fresh upstream fetch"
    );
}

#[tokio::test]
async fn test_different_queries_are_distinct_keys() {
    let (upstream, hits) = spawn_upstream().await;
    let relay = spawn_relay(test_config(upstream)).await;
    let client = reqwest::Client::new();

    for query in ["x=1", "x=2"] {
        let response = client
            .get(format!("http://{relay}/foo?{query}"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.headers().get("x-cache").unwrap(), "MISS");
    }

    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_request_body_forwarded_on_miss() {
    let (upstream, _hits) = spawn_upstream().await;
    let relay = spawn_relay(test_config(upstream)).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{relay}/echo"))
        .body("ping")
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers().get("x-cache").unwrap(), "MISS");
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"ping");
}

// == Pass-Through Mode ==

#[tokio::test]
async fn test_passthrough_mode_adds_no_cache_header() {
    let (upstream, hits) = spawn_upstream().await;
    let config = Config {
        cache_enabled: false,
        ..test_config(upstream)
    };
    let relay = spawn_relay(config).await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let response = client
            .get(format!("http://{relay}/foo"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert!(
            response.headers().get("x-cache").is_none(),
            "Pass-through mode must not inject X-Cache"
        );
        assert_eq!(response.bytes().await.unwrap().as_ref(), b"hello");
    }

    assert_eq!(
        hits.load(Ordering::SeqCst),
        2,
        "Every request reaches the upstream without a cache"
    );
}

// == Upstream Failure ==

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway_and_never_cached() {
    let dead = dead_addr().await;
    let relay = spawn_relay(test_config(dead)).await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let response = client
            .get(format!("http://{relay}/foo"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
        assert!(
            response.headers().get("x-cache").is_none(),
            "Failures must not carry a cache status"
        );
    }
}

// == Host Rewrite ==

#[tokio::test]
async fn test_host_header_rewritten_to_upstream_origin() {
    let (upstream, _hits) = spawn_upstream().await;
    let relay = spawn_relay(test_config(upstream)).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{relay}/host"))
        .send()
        .await
        .unwrap();

    let seen_host = response.text().await.unwrap();
    assert_eq!(
        seen_host,
        format!("127.0.0.1:{}", upstream.port()),
        "Upstream must see its own origin in Host"
    );
}

// == Rate Limiting ==

#[tokio::test]
async fn test_quota_exhaustion_returns_throttling_response() {
    let (upstream, _hits) = spawn_upstream().await;
    let config = Config {
        rate_limit_max: 3,
        ..test_config(upstream)
    };
    let relay = spawn_relay(config).await;
    let client = reqwest::Client::new();

    // The full quota passes through normally
    for _ in 0..3 {
        let response = client
            .get(format!("http://{relay}/foo"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }

    // One past the quota is refused without reaching the upstream
    let throttled = client
        .get(format!("http://{relay}/foo"))
        .send()
        .await
        .unwrap();
    assert_eq!(throttled.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);
    assert!(
        throttled.headers().get("x-content-type-options").is_some(),
        "Security headers apply to throttled responses too"
    );
    assert_eq!(
        throttled.text().await.unwrap(),
        "Too many requests from this IP, please try again later."
    );
}

// == Middleware Headers ==

#[tokio::test]
async fn test_security_and_cors_headers_on_responses() {
    let (upstream, _hits) = spawn_upstream().await;
    let relay = spawn_relay(test_config(upstream)).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{relay}/foo"))
        .header("origin", "http://example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(
        response.headers().get("x-frame-options").unwrap(),
        "SAMEORIGIN"
    );
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}
