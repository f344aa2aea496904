//! Resilience primitives for outbound backend calls.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`retry`] | Bounded exponential-backoff retry driven by error classification |
//! | [`rate_limiter`] | Per-client fixed-window daily quota |
//!
//! ## Retry
//!
//! ```rust
//! use ryzn_tutor::resilience::{RetryConfig, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(
//!     RetryConfig::new()
//!         .with_max_attempts(3)
//!         .with_base_delay(Duration::from_millis(500)),
//! );
//! assert_eq!(policy.backoff(2), Duration::from_millis(2000));
//! ```
//!
//! ## Rate Limiter
//!
//! ```rust
//! use ryzn_tutor::resilience::{RateLimiter, RateLimiterConfig};
//!
//! let limiter = RateLimiter::new(RateLimiterConfig::new().with_quota(2));
//! assert!(limiter.check_and_consume("10.0.0.1").is_allowed());
//! assert!(limiter.check_and_consume("10.0.0.1").is_allowed());
//! assert!(!limiter.check_and_consume("10.0.0.1").is_allowed());
//! ```

pub mod rate_limiter;
pub mod retry;

pub use rate_limiter::{RateDecision, RateLimiter, RateLimiterConfig};
pub use retry::{RetryConfig, RetryPolicy};
