//! Periodic Sweep Task
//!
//! Background task that removes expired cache entries and idle rate-limit
//! windows at a configured interval. Expiry itself never depends on the
//! sweep — lookups ignore expired entries regardless — so the task only
//! reclaims memory.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ResponseCache;
use crate::ratelimit::RateLimiter;

/// Spawns the background sweep task.
///
/// The task loops forever, sleeping for the configured interval between
/// sweeps. With caching disabled the cache half is skipped and only the rate
/// limiter is pruned.
///
/// # Arguments
/// * `cache` - Response cache, if caching is enabled
/// * `limiter` - Per-IP rate limiter
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during shutdown.
pub fn spawn_cleanup_task(
    cache: Option<ResponseCache>,
    limiter: RateLimiter,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting sweep task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            if let Some(cache) = &cache {
                let removed = cache.cleanup_expired().await;

                if removed > 0 {
                    let stats = cache.stats().await;
                    info!(
                        "TTL sweep: removed {} expired entries, {} live, hit rate {:.2}",
                        removed,
                        stats.total_entries,
                        stats.hit_rate()
                    );
                } else {
                    debug!("TTL sweep: no expired entries found");
                }
            }

            let pruned = limiter.prune_stale().await;
            if pruned > 0 {
                debug!("Rate limiter sweep: dropped {} idle clients", pruned);
            }
        }
    })
}
