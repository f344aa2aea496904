//! In-memory, time-boxed response cache.

use super::key::Fingerprint;
use crate::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub enabled: bool,
    /// Serialized payloads larger than this are not stored.
    pub max_entry_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            enabled: true,
            max_entry_size: 1024 * 1024,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_max_entry_size(mut self, bytes: usize) -> Self {
        self.max_entry_size = bytes;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub puts: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    puts: AtomicU64,
    evictions: AtomicU64,
}

impl AtomicStats {
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            puts: self.puts.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

struct CacheEntry {
    payload: serde_json::Value,
    stored_at: Instant,
}

/// Process-local response cache keyed by [`Fingerprint`].
///
/// Entries are read-only once stored and leave only through
/// [`sweep`](Self::sweep); an expired entry still in the map reads as a miss.
/// Only successful results are stored.
pub struct ResponseCache {
    config: CacheConfig,
    entries: RwLock<HashMap<Fingerprint, CacheEntry>>,
    stats: AtomicStats,
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
            stats: AtomicStats::default(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn get<T: DeserializeOwned>(&self, key: &Fingerprint) -> Option<T> {
        if !self.config.enabled {
            return None;
        }
        let payload = {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            entries
                .get(key)
                .filter(|e| e.stored_at.elapsed() < self.config.ttl)
                .map(|e| e.payload.clone())
        };
        match payload.and_then(|p| serde_json::from_value(p).ok()) {
            Some(value) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = key.digest().as_str(), "response cache hit");
                Some(value)
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store `value`, replacing any previous entry for `key`.
    pub fn put<T: Serialize>(&self, key: Fingerprint, value: &T) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let payload = serde_json::to_value(value)?;
        let size = serde_json::to_vec(&payload)?.len();
        if size > self.config.max_entry_size {
            debug!(
                key = key.digest().as_str(),
                size,
                "response too large to cache"
            );
            return Ok(());
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key,
            CacheEntry {
                payload,
                stored_at: Instant::now(),
            },
        );
        self.stats.puts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Remove every entry older than the TTL. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let ttl = self.config.ttl;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, e| e.stored_at.elapsed() < ttl);
        let removed = before - entries.len();
        self.stats
            .evictions
            .fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }
}
