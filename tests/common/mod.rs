//! Shared fixtures for backend integration tests.

#![allow(dead_code)]

use mockito::{Server, ServerGuard};
use ryzn_tutor::cache::CacheConfig;
use ryzn_tutor::resilience::{RateLimiterConfig, RetryConfig};
use ryzn_tutor::{BackendConfig, TutorClient};
use std::time::Duration;

/// A mock backend plus a client pointed at it.
pub struct MockBackend {
    pub server: ServerGuard,
    pub client: TutorClient,
}

impl MockBackend {
    /// Retries use a 10 ms base delay so retry tests stay fast.
    pub async fn new() -> Self {
        Self::with_config(|cfg| cfg).await
    }

    pub async fn with_config(tweak: impl FnOnce(BackendConfig) -> BackendConfig) -> Self {
        let server = Server::new_async().await;
        let config = BackendConfig::new(&server.url())
            .expect("mock url is valid")
            .with_request_timeout(Duration::from_secs(5))
            .with_retry(
                RetryConfig::new()
                    .with_max_attempts(3)
                    .with_base_delay(Duration::from_millis(10)),
            )
            .with_rate_limit(RateLimiterConfig::new())
            .with_cache(CacheConfig::new())
            .with_tts_chunk_delay(Duration::ZERO);
        let client = TutorClient::new(tweak(config)).expect("client builds");
        Self { server, client }
    }
}
