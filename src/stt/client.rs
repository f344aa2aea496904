//! STT (Speech-to-Text) client.

use super::types::{AudioUpload, Transcription};
use crate::resilience::RetryPolicy;
use crate::transport::{HttpTransport, RequestBody, RequestOptions};
use crate::{Error, ErrorContext, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use std::sync::Arc;
use tracing::info;

const TRANSCRIBE_PATH: &str = "transcribe_audio";

/// Client for speech-to-text transcription.
#[derive(Clone)]
pub struct SttClient {
    transport: Arc<HttpTransport>,
    retry: RetryPolicy,
}

impl SttClient {
    pub fn new(transport: Arc<HttpTransport>) -> Self {
        let retry = RetryPolicy::new(transport.config().retry.clone());
        Self { transport, retry }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Upload one recording and return its transcription.
    ///
    /// Empty payloads and non-audio MIME types are rejected before any
    /// request is made. Uses the upload timeout rather than the default one.
    pub async fn transcribe(&self, upload: &AudioUpload) -> Result<Transcription> {
        validate(upload)?;

        let options = RequestOptions::new().with_timeout(self.transport.config().upload_timeout);
        let transcription: Transcription = self
            .retry
            .run(|| async {
                let form = build_form(upload)?;
                self.transport
                    .execute_json(
                        Method::POST,
                        TRANSCRIBE_PATH,
                        RequestBody::Multipart(form),
                        &options,
                    )
                    .await
            })
            .await?;

        info!(
            bytes = upload.data.len(),
            mime = upload.mime_type.as_str(),
            chars = transcription.text.chars().count(),
            "transcription finished"
        );
        Ok(transcription)
    }
}

fn validate(upload: &AudioUpload) -> Result<()> {
    let context = || ErrorContext::new().with_source("stt");
    if upload.data.is_empty() {
        return Err(Error::invalid_input_with_context(
            "audio file is empty",
            context(),
        ));
    }
    if !upload.mime_type.trim().to_ascii_lowercase().starts_with("audio/") {
        return Err(Error::invalid_input_with_context(
            format!("unsupported file type: {}", upload.mime_type),
            context().with_details("expected an audio/* MIME type"),
        ));
    }
    Ok(())
}

fn build_form(upload: &AudioUpload) -> Result<Form> {
    let part = Part::bytes(upload.data.to_vec())
        .file_name(upload.file_name.clone())
        .mime_str(&upload.mime_type)
        .map_err(|e| {
            Error::invalid_input_with_context(
                format!("invalid MIME type {}: {}", upload.mime_type, e),
                ErrorContext::new().with_source("stt"),
            )
        })?;
    Ok(Form::new().part("file", part))
}
