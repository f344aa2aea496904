//! Shared resilience state with an explicit lifecycle.
//!
//! One [`ResilienceState`] is created at startup and handed to every client
//! that needs the response cache or the rate limiter. Nothing here is a
//! global: tests build their own state and never see each other's entries.

use crate::cache::{CacheConfig, ResponseCache};
use crate::config::BackendConfig;
use crate::resilience::{RateLimiter, RateLimiterConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Clone)]
pub struct ResilienceState {
    cache: Arc<ResponseCache>,
    limiter: Arc<RateLimiter>,
}

impl ResilienceState {
    pub fn new(cache: CacheConfig, rate_limit: RateLimiterConfig) -> Self {
        Self {
            cache: Arc::new(ResponseCache::new(cache)),
            limiter: Arc::new(RateLimiter::new(rate_limit)),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(config.cache.clone(), config.rate_limit.clone())
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Run one sweep of both maps. Returns (cache entries, limiter entries) removed.
    pub fn sweep(&self) -> (usize, usize) {
        (self.cache.sweep(), self.limiter.sweep())
    }

    /// Start the periodic sweep task. Must be called from within a tokio runtime.
    ///
    /// The first sweep runs one `interval` after the call.
    pub fn spawn_sweeper(&self, interval: Duration) -> SweeperHandle {
        let token = CancellationToken::new();
        let state = self.clone();
        let cancel = token.clone();
        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let (cached, limited) = state.sweep();
                        debug!(cache_evicted = cached, limiter_evicted = limited, "sweep finished");
                    }
                }
            }
        });
        info!(interval_secs = interval.as_secs(), "resilience sweeper started");
        SweeperHandle { token, task }
    }
}

/// Owns the sweeper task; dropping it without [`shutdown`](Self::shutdown)
/// leaves the task running until the runtime stops.
pub struct SweeperHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the sweeper and wait for it to exit.
    pub async fn shutdown(self) {
        self.token.cancel();
        let _ = self.task.await;
        info!("resilience sweeper stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
