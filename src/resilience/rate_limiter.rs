use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Requests allowed per client within one window.
    pub quota: u32,
    pub window: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            quota: 30,
            window: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl RateLimiterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(mut self, quota: u32) -> Self {
        self.quota = quota;
        self
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    /// `retry_after` is the time left until the client's window resets.
    Denied { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    window_start: Instant,
}

/// Per-client fixed-window request counter.
///
/// A window opens on a client's first request and resets wholesale once
/// `now - window_start` exceeds the window. This is a fixed window, not a
/// sliding one: a client can spend a full quota at the end of one window and
/// another right after the reset.
///
/// The lookup and the increment happen under a single lock with no await in
/// between, so concurrent callers never double-spend a slot.
pub struct RateLimiter {
    cfg: RateLimiterConfig,
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl RateLimiter {
    pub fn new(cfg: RateLimiterConfig) -> Self {
        Self {
            cfg,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.cfg
    }

    pub fn check_and_consume(&self, client_id: &str) -> RateDecision {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let fresh = WindowEntry {
            count: 0,
            window_start: now,
        };
        let entry = entries.entry(client_id.to_string()).or_insert(fresh);
        if now.duration_since(entry.window_start) > self.cfg.window {
            *entry = fresh;
        }

        if entry.count >= self.cfg.quota {
            let elapsed = now.duration_since(entry.window_start);
            let retry_after = self.cfg.window.saturating_sub(elapsed);
            debug!(
                quota = self.cfg.quota,
                retry_after_secs = retry_after.as_secs(),
                "rate limit quota exhausted"
            );
            return RateDecision::Denied { retry_after };
        }

        entry.count += 1;
        RateDecision::Allowed {
            remaining: self.cfg.quota - entry.count,
        }
    }

    /// Like [`check_and_consume`](Self::check_and_consume), but a denial
    /// becomes [`Error::RateLimited`].
    pub fn enforce(&self, client_id: &str) -> Result<()> {
        match self.check_and_consume(client_id) {
            RateDecision::Allowed { .. } => Ok(()),
            RateDecision::Denied { retry_after } => Err(Error::RateLimited {
                message: format!(
                    "daily limit reached: limited to {} requests per {}h",
                    self.cfg.quota,
                    self.cfg.window.as_secs() / 3600
                ),
                retry_after: Some(retry_after),
            }),
        }
    }

    /// Drop clients whose window has expired. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, e| now.duration_since(e.window_start) <= self.cfg.window);
        before - entries.len()
    }

    /// Number of tracked clients.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
