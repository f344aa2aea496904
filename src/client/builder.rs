use crate::client::core::TutorClient;
use crate::config::BackendConfig;
use crate::resilience::{RetryConfig, RetryPolicy};
use crate::state::ResilienceState;
use crate::transport::HttpTransport;
use crate::Result;
use std::sync::Arc;

/// Builder for [`TutorClient`].
///
/// Without an explicit config the client reads `RYZN_*` environment
/// variables. Without an explicit state it creates its own; pass one in to
/// share the cache and rate limiter between clients.
#[derive(Default)]
pub struct TutorClientBuilder {
    config: Option<BackendConfig>,
    base_url: Option<String>,
    state: Option<ResilienceState>,
    retry: Option<RetryConfig>,
}

impl TutorClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: BackendConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the backend URL (mock servers in tests, staging deployments).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn state(mut self, state: ResilienceState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn build(self) -> Result<TutorClient> {
        let mut config = match self.config {
            Some(config) => config,
            None => BackendConfig::from_env()?,
        };
        if let Some(url) = self.base_url {
            config = config.with_base_url(&url)?;
        }
        if let Some(retry) = self.retry {
            config = config.with_retry(retry);
        }

        let state = self
            .state
            .unwrap_or_else(|| ResilienceState::from_config(&config));
        let retry = RetryPolicy::new(config.retry.clone());
        let transport = Arc::new(HttpTransport::new(&config)?);

        Ok(TutorClient {
            transport,
            state,
            retry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_overrides_apply() {
        let client = TutorClientBuilder::new()
            .config(BackendConfig::new("http://localhost:8000").unwrap())
            .base_url("http://127.0.0.1:9999/api")
            .retry(RetryConfig::new().with_max_attempts(5))
            .build()
            .unwrap();
        assert_eq!(client.config().base_url.as_str(), "http://127.0.0.1:9999/api/");
        assert_eq!(client.retry_policy().config().max_attempts, 5);
    }

    #[test]
    fn test_shared_state() {
        let state = ResilienceState::new(Default::default(), Default::default());
        let config = BackendConfig::new("http://localhost:8000")
            .unwrap()
            .with_request_timeout(Duration::from_secs(1));
        let a = TutorClientBuilder::new()
            .config(config.clone())
            .state(state.clone())
            .build()
            .unwrap();
        let b = TutorClientBuilder::new().config(config).state(state).build().unwrap();
        assert!(Arc::ptr_eq(a.state().limiter(), b.state().limiter()));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = TutorClientBuilder::new()
            .config(BackendConfig::new("http://localhost:8000").unwrap())
            .base_url("ftp://example.com")
            .build()
            .unwrap_err();
        assert_eq!(err.code(), crate::error_code::ErrorCode::UnknownError);
    }
}
