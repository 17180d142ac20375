//! Configuration Module
//!
//! Handles loading and managing proxy configuration from environment variables.

use std::env;

/// Proxy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listening port
    pub port: u16,
    /// Base URL of the fixed upstream target
    pub upstream_url: String,
    /// Whether response caching is enabled (pass-through mode when false)
    pub cache_enabled: bool,
    /// TTL in seconds applied to every cached response
    pub cache_ttl: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Rate limit window length in seconds
    pub rate_limit_window: u64,
    /// Maximum requests per client IP within one window
    pub rate_limit_max: u32,
    /// Plain-text body returned to throttled clients
    pub rate_limit_message: String,
    /// Upstream request timeout in seconds
    pub upstream_timeout: u64,
    /// Whether to listen over TLS (production mode)
    pub tls_enabled: bool,
    /// Path to the PEM certificate used in production mode
    pub tls_cert_path: String,
    /// Path to the PEM private key used in production mode
    pub tls_key_path: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - Listening port (default: 3000)
    /// - `UPSTREAM_URL` - Upstream base URL (default: https://lmarena.ai)
    /// - `CACHE_ENABLED` - Enable response caching (default: true)
    /// - `CACHE_TTL` - Cache TTL in seconds (default: 60)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 30)
    /// - `RATE_LIMIT_WINDOW` - Rate limit window in seconds (default: 900)
    /// - `RATE_LIMIT_MAX` - Requests allowed per window (default: 100)
    /// - `RATE_LIMIT_MESSAGE` - Body sent to throttled clients
    /// - `UPSTREAM_TIMEOUT` - Upstream request timeout in seconds (default: 30)
    /// - `APP_ENV` - `production` switches the listener to TLS
    /// - `TLS_CERT_PATH` / `TLS_KEY_PATH` - Certificate material for TLS mode
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            upstream_url: env::var("UPSTREAM_URL")
                .unwrap_or_else(|_| "https://lmarena.ai".to_string()),
            cache_enabled: env::var("CACHE_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            cache_ttl: env::var("CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            rate_limit_window: env::var("RATE_LIMIT_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(900),
            rate_limit_max: env::var("RATE_LIMIT_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            rate_limit_message: env::var("RATE_LIMIT_MESSAGE").unwrap_or_else(|_| {
                "Too many requests from this IP, please try again later.".to_string()
            }),
            upstream_timeout: env::var("UPSTREAM_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            tls_enabled: env::var("APP_ENV")
                .map(|v| v == "production")
                .unwrap_or(false),
            tls_cert_path: env::var("TLS_CERT_PATH")
                .unwrap_or_else(|_| "certs/cert.pem".to_string()),
            tls_key_path: env::var("TLS_KEY_PATH")
                .unwrap_or_else(|_| "certs/key.pem".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            upstream_url: "https://lmarena.ai".to_string(),
            cache_enabled: true,
            cache_ttl: 60,
            cleanup_interval: 30,
            rate_limit_window: 900,
            rate_limit_max: 100,
            rate_limit_message: "Too many requests from this IP, please try again later."
                .to_string(),
            upstream_timeout: 30,
            tls_enabled: false,
            tls_cert_path: "certs/cert.pem".to_string(),
            tls_key_path: "certs/key.pem".to_string(),
        }
    }
}
