//! Backend configuration.
//!
//! Defaults are production-friendly and every knob is env-overridable; see
//! [`BackendConfig::from_env`]. Malformed numeric values fall back to the
//! default rather than failing startup.

use crate::cache::CacheConfig;
use crate::resilience::{RateLimiterConfig, RetryConfig};
use crate::{Error, ErrorContext, Result};
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: Url,
    /// Applied to every call that does not override it.
    pub request_timeout: Duration,
    pub health_timeout: Duration,
    /// Large uploads (transcription).
    pub upload_timeout: Duration,
    pub retry: RetryConfig,
    pub rate_limit: RateLimiterConfig,
    pub cache: CacheConfig,
    /// Pause between spoken units during TTS streaming.
    pub tts_chunk_delay: Duration,
}

impl BackendConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            request_timeout: Duration::from_secs(30),
            health_timeout: Duration::from_secs(5),
            upload_timeout: Duration::from_secs(300),
            retry: RetryConfig::default(),
            rate_limit: RateLimiterConfig::default(),
            cache: CacheConfig::default(),
            tts_chunk_delay: Duration::from_millis(50),
        })
    }

    /// Build from `RYZN_*` environment variables.
    ///
    /// The base URL is read from `RYZN_BACKEND_URL`, then `BACKEND_URL`,
    /// falling back to [`DEFAULT_BACKEND_URL`].
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("RYZN_BACKEND_URL")
            .or_else(|_| env::var("BACKEND_URL"))
            .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        let mut cfg = Self::new(&base_url)?;

        if let Some(secs) = env_parse::<u64>("RYZN_HTTP_TIMEOUT_SECS") {
            cfg.request_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(secs) = env_parse::<u64>("RYZN_HEALTH_TIMEOUT_SECS") {
            cfg.health_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(secs) = env_parse::<u64>("RYZN_UPLOAD_TIMEOUT_SECS") {
            cfg.upload_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(n) = env_parse::<u32>("RYZN_RETRY_MAX_ATTEMPTS") {
            cfg.retry = cfg.retry.with_max_attempts(n);
        }
        if let Some(ms) = env_parse::<u64>("RYZN_RETRY_BASE_DELAY_MS") {
            cfg.retry = cfg.retry.with_base_delay(Duration::from_millis(ms));
        }
        if let Some(quota) = env_parse::<u32>("RYZN_RATE_LIMIT_QUOTA") {
            cfg.rate_limit = cfg.rate_limit.with_quota(quota);
        }
        if let Some(secs) = env_parse::<u64>("RYZN_RATE_LIMIT_WINDOW_SECS") {
            cfg.rate_limit = cfg.rate_limit.with_window(Duration::from_secs(secs.max(1)));
        }
        if let Some(secs) = env_parse::<u64>("RYZN_CACHE_TTL_SECS") {
            cfg.cache = cfg.cache.with_ttl(Duration::from_secs(secs));
        }
        if let Some(ms) = env_parse::<u64>("RYZN_TTS_CHUNK_DELAY_MS") {
            cfg.tts_chunk_delay = Duration::from_millis(ms);
        }
        Ok(cfg)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimiterConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_tts_chunk_delay(mut self, delay: Duration) -> Self {
        self.tts_chunk_delay = delay;
        self
    }

    /// Resolve an endpoint path against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path.trim_start_matches('/')).map_err(|e| {
            Error::Configuration {
                message: format!("invalid endpoint path: {}", e),
                context: ErrorContext::new()
                    .with_source("config")
                    .with_details(path.to_string()),
            }
        })
    }
}

// The base URL always ends with '/', so relative joins append instead of
// replacing the last path segment.
fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    let url = Url::parse(&normalized).map_err(|e| Error::Configuration {
        message: format!("invalid backend URL: {}", e),
        context: ErrorContext::new()
            .with_source("config")
            .with_details(raw.to_string()),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::configuration(format!(
            "backend URL must be http or https, got '{}'",
            url.scheme()
        )));
    }
    Ok(url)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = BackendConfig::new(DEFAULT_BACKEND_URL).unwrap();
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
        assert_eq!(cfg.health_timeout, Duration::from_secs(5));
        assert_eq!(cfg.upload_timeout, Duration::from_secs(300));
        assert_eq!(cfg.retry.max_attempts, 3);
        assert_eq!(cfg.rate_limit.quota, 30);
        assert_eq!(cfg.cache.ttl, Duration::from_secs(3600));
        assert_eq!(cfg.tts_chunk_delay, Duration::from_millis(50));
    }

    #[test]
    fn test_endpoint_join_keeps_base_path() {
        let cfg = BackendConfig::new("https://tutor.example.com/api").unwrap();
        assert_eq!(
            cfg.endpoint("/text_to_speech").unwrap().as_str(),
            "https://tutor.example.com/api/text_to_speech"
        );
        assert_eq!(
            cfg.endpoint("conversations/u-1").unwrap().as_str(),
            "https://tutor.example.com/api/conversations/u-1"
        );
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(matches!(
            BackendConfig::new("not a url"),
            Err(Error::Configuration { .. })
        ));
        assert!(matches!(
            BackendConfig::new("ftp://example.com"),
            Err(Error::Configuration { .. })
        ));
    }
}
