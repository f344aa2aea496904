use crate::client::builder::TutorClientBuilder;
use crate::config::BackendConfig;
use crate::resilience::{RetryConfig, RetryPolicy};
use crate::state::ResilienceState;
use crate::stt::{AudioUpload, SttClient, Transcription};
use crate::transport::{HttpTransport, RequestBody, RequestOptions};
use crate::tts::{AudioPlayer, StreamOptions, TtsClient, TtsStreamer};
use crate::{Error, Result};
use reqwest::Method;
use std::sync::Arc;
use tracing::debug;

/// Client for the tutoring backend.
///
/// Cheap to clone; clones share one connection pool and one
/// [`ResilienceState`].
#[derive(Clone)]
pub struct TutorClient {
    pub(crate) transport: Arc<HttpTransport>,
    pub(crate) state: ResilienceState,
    pub(crate) retry: RetryPolicy,
}

impl std::fmt::Debug for TutorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorClient")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl TutorClient {
    /// Create a client from `RYZN_*` environment variables.
    pub fn from_env() -> Result<Self> {
        TutorClientBuilder::new().build()
    }

    pub fn new(config: BackendConfig) -> Result<Self> {
        TutorClientBuilder::new().config(config).build()
    }

    pub fn builder() -> TutorClientBuilder {
        TutorClientBuilder::new()
    }

    pub fn config(&self) -> &BackendConfig {
        self.transport.config()
    }

    pub fn state(&self) -> &ResilienceState {
        &self.state
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Text-to-speech client bound to the same transport.
    pub fn tts(&self) -> TtsClient {
        TtsClient::new(self.transport.clone()).with_retry(self.retry.clone())
    }

    pub fn stt(&self) -> SttClient {
        SttClient::new(self.transport.clone()).with_retry(self.retry.clone())
    }

    /// Streaming speech over this client's TTS endpoint, with the configured
    /// inter-unit delay.
    ///
    /// Each unit gets a single synthesis attempt: a failed unit is shown
    /// without audio instead of holding back the rest of the transcript.
    pub fn streamer<P: AudioPlayer>(&self, player: P) -> TtsStreamer<TtsClient, P> {
        let synthesizer = TtsClient::new(self.transport.clone())
            .with_retry(RetryPolicy::new(RetryConfig::new().with_max_attempts(1)));
        TtsStreamer::new(synthesizer, player)
            .with_options(StreamOptions::from_config(self.config()))
    }

    /// `GET /health` with the short health timeout and no retry.
    pub async fn health(&self) -> Result<()> {
        let options = RequestOptions::new().with_timeout(self.config().health_timeout);
        let result = self
            .transport
            .execute_bytes(Method::GET, "health", RequestBody::Empty, &options)
            .await
            .map(|_| ());
        finish("health", result)
    }

    pub async fn transcribe(&self, upload: &AudioUpload) -> Result<Transcription> {
        finish("transcribe", self.stt().transcribe(upload).await)
    }
}

/// Every public operation ends here so callers only see classified errors.
pub(crate) fn finish<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    result.map_err(|e| {
        let e = e.normalize();
        debug!(
            operation,
            error_code = e.code().code(),
            status = e.status(),
            "operation failed"
        );
        e
    })
}

/// Reject a missing user identity before any network call.
pub(crate) fn require_user(user_id: &str) -> Result<&str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        Err(Error::unauthenticated())
    } else {
        Ok(trimmed)
    }
}
