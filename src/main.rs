//! Cache Relay - a lightweight caching reverse proxy
//!
//! Forwards every request to a fixed upstream host, optionally serving
//! repeated requests from a short-lived in-memory response cache.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use axum_server::tls_rustls::RustlsConfig;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_relay::{create_router, spawn_cleanup_task, AppState, Config};

/// Main entry point for the relay.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build application state (cache store, rate limiter, upstream client)
/// 4. Start the background sweep task
/// 5. Create the Axum router with the middleware stack
/// 6. Serve over cleartext, or TLS in production mode
/// 7. Handle graceful shutdown on SIGINT/SIGTERM, clearing the cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cache Relay");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: upstream={}, cache_enabled={}, ttl={}s, port={}, rate_limit={}/{}s",
        config.upstream_url,
        config.cache_enabled,
        config.cache_ttl,
        config.port,
        config.rate_limit_max,
        config.rate_limit_window
    );

    // Build application state; a bad upstream URL aborts startup here
    let state = AppState::from_config(&config).context("invalid configuration")?;
    info!("Relay state initialized");

    // Start background sweep task
    let cleanup_handle = spawn_cleanup_task(
        state.cache.clone(),
        state.limiter.clone(),
        config.cleanup_interval,
    );

    // Create router with the middleware stack
    let app = create_router(state.clone());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    if config.tls_enabled {
        // Production mode: unreadable certificate material is fatal, the
        // process must not start serving on a broken listener
        let rustls_config =
            RustlsConfig::from_pem_file(&config.tls_cert_path, &config.tls_key_path)
                .await
                .with_context(|| {
                    format!(
                        "failed to load TLS certificate material from {} / {}",
                        config.tls_cert_path, config.tls_key_path
                    )
                })?;
        info!("Server listening on https://{}", addr);

        let handle = axum_server::Handle::new();
        {
            let handle = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                handle.graceful_shutdown(Some(Duration::from_secs(10)));
            });
        }

        axum_server::bind_rustls(addr, rustls_config)
            .handle(handle)
            .serve(app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .context("TLS server error")?;
    } else {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        info!("Server listening on http://{}", addr);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    }

    // Teardown: stop the sweep and drop every cached entry
    cleanup_handle.abort();
    warn!("Sweep task aborted");
    if let Some(cache) = &state.cache {
        cache.clear().await;
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
