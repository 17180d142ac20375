//! Fixed-Window Rate Limiter
//!
//! Counts requests per client IP over a fixed window. The window opens on a
//! client's first request and resets once its full length has elapsed; a
//! client may spend its whole quota at any pace within the window and the
//! quota-plus-first request is refused regardless of spacing.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

// == Window ==
/// Per-client request counter for the current window.
#[derive(Debug, Clone)]
struct Window {
    /// When this client's current window opened
    started_at: Instant,
    /// Requests seen in the current window
    count: u32,
}

// == Rate Limiter ==
/// Per-IP fixed-window request limiter.
///
/// Like the response cache, synchronization lives inside; callers clone the
/// limiter and call `check` concurrently.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    windows: Arc<RwLock<HashMap<IpAddr, Window>>>,
    /// Window length
    window: Duration,
    /// Requests allowed per client per window
    max_requests: u32,
}

impl RateLimiter {
    // == Constructor ==
    /// Creates a limiter allowing `max_requests` per client per
    /// `window_seconds`.
    pub fn new(window_seconds: u64, max_requests: u32) -> Self {
        Self {
            windows: Arc::new(RwLock::new(HashMap::new())),
            window: Duration::from_secs(window_seconds),
            max_requests,
        }
    }

    // == Check ==
    /// Records one request from `client` and reports whether it is allowed.
    ///
    /// Returns `true` for the first `max_requests` requests of a window and
    /// `false` from then until the window resets.
    pub async fn check(&self, client: IpAddr) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.write().await;

        let window = windows.entry(client).or_insert(Window {
            started_at: now,
            count: 0,
        });

        if now.duration_since(window.started_at) >= self.window {
            window.started_at = now;
            window.count = 0;
        }

        window.count += 1;
        window.count <= self.max_requests
    }

    // == Prune Stale ==
    /// Drops clients whose window has fully elapsed.
    ///
    /// Their next request would reset the window anyway; pruning just keeps
    /// the map from accumulating idle clients. Returns the number removed.
    pub async fn prune_stale(&self) -> usize {
        let now = Instant::now();
        let mut windows = self.windows.write().await;

        let before = windows.len();
        windows.retain(|_, w| now.duration_since(w.started_at) < self.window);
        before - windows.len()
    }

    // == Tracked Clients ==
    /// Returns the number of clients currently tracked.
    pub async fn tracked_clients(&self) -> usize {
        self.windows.read().await.len()
    }
}
