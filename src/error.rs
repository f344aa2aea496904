use crate::error_code::ErrorCode;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Structured error context for logging and debugging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Component that raised the error (e.g., "transport", "tts_stream").
    pub source: Option<String>,
    /// Additional detail (endpoint, request id, offending value).
    pub details: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Closed error taxonomy for every public operation.
///
/// Transport failures are classified once, in [`crate::transport`], and flow
/// unchanged through the retry policy. Use [`Error::code`] for the
/// machine-readable discriminant and [`Error::payload`] for the UI shape.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Request timed out after {}ms{}", .elapsed.as_millis(), format_context(.context))]
    Timeout {
        elapsed: Duration,
        context: ErrorContext,
    },

    #[error("Network error: {message}{}", format_context(.context))]
    Network {
        message: String,
        context: ErrorContext,
    },

    #[error("HTTP {status} ({code}): {message}")]
    Http {
        status: u16,
        code: ErrorCode,
        message: String,
    },

    #[error("Invalid input: {message}{}", format_context(.context))]
    InvalidInput {
        message: String,
        context: ErrorContext,
    },

    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("TTS processing error: {message}{}", format_context(.context))]
    TtsProcessing {
        message: String,
        context: ErrorContext,
    },

    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    #[error("Playback error: {message}{}", format_context(.context))]
    Playback {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error: {message}{}", format_context(.context))]
    Unknown {
        message: String,
        context: ErrorContext,
    },
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn network_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Network {
            message: msg.into(),
            context,
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn invalid_input_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::InvalidInput {
            message: msg.into(),
            context,
        }
    }

    pub fn tts_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::TtsProcessing {
            message: msg.into(),
            context,
        }
    }

    pub fn playback_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Playback {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn unauthenticated() -> Self {
        Error::Unauthenticated {
            message: "sign in required".to_string(),
        }
    }

    pub fn unknown_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Unknown {
            message: msg.into(),
            context,
        }
    }

    /// Machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Timeout { .. } => ErrorCode::Timeout,
            Error::Network { .. } => ErrorCode::NetworkError,
            Error::Http { code, .. } => *code,
            Error::InvalidInput { .. } => ErrorCode::InvalidInput,
            Error::RateLimited { .. } => ErrorCode::RateLimited,
            Error::TtsProcessing { .. } => ErrorCode::TtsProcessingError,
            Error::Unauthenticated { .. } => ErrorCode::Unauthenticated,
            Error::Playback { .. } => ErrorCode::PlaybackError,
            Error::Configuration { .. }
            | Error::Serialization(_)
            | Error::Io(_)
            | Error::Unknown { .. } => ErrorCode::UnknownError,
        }
    }

    /// HTTP-style status: the backend's own status for `Http`, else the code default.
    pub fn status(&self) -> u16 {
        match self {
            Error::Http { status, .. } => *status,
            other => other.code().http_status(),
        }
    }

    /// Whether a retry could plausibly change the outcome.
    ///
    /// Client-side HTTP rejections (4xx other than 429) and errors raised
    /// locally before any network call are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http { status, .. } => !((400..500).contains(status) && *status != 429),
            Error::InvalidInput { .. }
            | Error::Unauthenticated { .. }
            | Error::RateLimited { .. }
            | Error::Configuration { .. } => false,
            _ => true,
        }
    }

    /// Folds ambient variants into `Unknown` so callers only ever see the
    /// public taxonomy. Classified variants pass through unchanged.
    pub fn normalize(self) -> Self {
        match self {
            Error::Configuration { message, context } => Error::Unknown { message, context },
            Error::Serialization(e) => Error::unknown_with_context(
                e.to_string(),
                ErrorContext::new().with_source("serialization"),
            ),
            Error::Io(e) => {
                Error::unknown_with_context(e.to_string(), ErrorContext::new().with_source("io"))
            }
            other => other,
        }
    }

    /// The consistent shape handed to a UI layer.
    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload::from(self)
    }
}

/// Wire/UI representation of an error: `{status, code, message, details}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub status: u16,
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&Error> for ErrorPayload {
    fn from(err: &Error) -> Self {
        let code = err.code();
        Self {
            status: err.status(),
            code,
            message: code.user_message().to_string(),
            details: Some(err.to_string()),
        }
    }
}
