//! TTS (Text-to-Speech) client.

use super::stream::SpeechSynthesizer;
use super::types::{AudioOutput, TtsOptions};
use crate::resilience::RetryPolicy;
use crate::transport::{HttpTransport, RequestBody, RequestOptions};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use tracing::debug;

const TTS_PATH: &str = "text_to_speech";

/// Client for the backend's `/text_to_speech` endpoint.
#[derive(Clone)]
pub struct TtsClient {
    transport: Arc<HttpTransport>,
    retry: RetryPolicy,
}

impl TtsClient {
    pub fn new(transport: Arc<HttpTransport>) -> Self {
        let retry = RetryPolicy::new(transport.config().retry.clone());
        Self { transport, retry }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Synthesize one piece of text, retrying transient failures.
    pub async fn synthesize(&self, text: &str, options: &TtsOptions) -> Result<AudioOutput> {
        if text.trim().is_empty() {
            return Err(Error::invalid_input_with_context(
                "text to synthesize is empty",
                ErrorContext::new().with_source("tts"),
            ));
        }

        let mut body = serde_json::json!({
            "text": text,
            "response_format": options.response_format.as_str(),
        });
        if let Some(voice) = &options.voice {
            body["voice"] = serde_json::Value::String(voice.clone());
        }

        let request_options =
            RequestOptions::new().with_header("accept", options.response_format.mime_type());
        let data = self
            .retry
            .run(|| {
                self.transport.execute_bytes(
                    Method::POST,
                    TTS_PATH,
                    RequestBody::Json(body.clone()),
                    &request_options,
                )
            })
            .await?;

        if data.is_empty() {
            return Err(Error::tts_with_context(
                "backend returned an empty audio payload",
                ErrorContext::new().with_source("tts"),
            ));
        }
        debug!(
            chars = text.chars().count(),
            bytes = data.len(),
            format = options.response_format.as_str(),
            "synthesized speech"
        );
        Ok(AudioOutput::new(data, options.response_format))
    }
}

#[async_trait]
impl SpeechSynthesizer for TtsClient {
    async fn synthesize(&self, text: &str, options: &TtsOptions) -> Result<AudioOutput> {
        TtsClient::synthesize(self, text, options).await
    }
}
