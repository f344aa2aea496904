//! Response caching for study-question calls.
//!
//! Identical (source text, query) pairs are answered from memory for an
//! hour instead of calling the backend again. The cache is process-local:
//! every instance of a horizontally scaled deployment has its own.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ResponseCache`] | TTL-bounded map with hit/miss statistics |
//! | [`CacheConfig`] | TTL, enable switch, and per-entry size limit |
//! | [`Fingerprint`] | Key derived from a text prefix and the query |
//!
//! ## Example
//!
//! ```rust
//! use ryzn_tutor::cache::{CacheConfig, Fingerprint, ResponseCache};
//! use std::time::Duration;
//!
//! let cache = ResponseCache::new(CacheConfig::new().with_ttl(Duration::from_secs(3600)));
//! let key = Fingerprint::new("Chapter 3: cell respiration ...", "What is glycolysis?");
//! cache.put(key.clone(), &serde_json::json!({"response": "The first stage ..."})).unwrap();
//! assert!(cache.get::<serde_json::Value>(&key).is_some());
//! ```
//!
//! Stale entries are removed by [`ResponseCache::sweep`], which
//! [`crate::state::ResilienceState::spawn_sweeper`] runs periodically.

mod key;
mod store;

pub use key::{Fingerprint, TEXT_PREFIX_CHARS};
pub use store::{CacheConfig, CacheStats, ResponseCache};
