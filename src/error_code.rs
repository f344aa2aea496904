//! Machine-readable error codes handed to the UI layer.
//!
//! Every [`crate::Error`] maps to exactly one [`ErrorCode`]. The code carries
//! the default HTTP-style status, the retry eligibility the code implies, and
//! a short user-facing message that is actionable rather than generic.
//!
//! ## Example
//!
//! ```rust
//! use ryzn_tutor::error_code::ErrorCode;
//!
//! let code = ErrorCode::from_http_status(429);
//! assert_eq!(code.code(), "RATE_LIMITED");
//! assert_eq!(code.http_status(), 429);
//! assert_eq!(code.user_message(), "Daily limit reached. Please try again tomorrow.");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No response arrived within the deadline.
    Timeout,
    /// Connection-level failure (DNS, refused, reset).
    NetworkError,
    /// 400: the backend rejected the request shape.
    BadRequest,
    /// 401 from the backend.
    Unauthorized,
    /// 403 from the backend.
    Forbidden,
    /// 404 from the backend.
    NotFound,
    /// 413: upload too large.
    PayloadTooLarge,
    /// 422: FastAPI validation failure.
    ValidationFailed,
    /// 429 from the backend, or the local daily quota.
    RateLimited,
    /// 5xx (other than 503/504).
    ServerError,
    /// 503.
    ServiceUnavailable,
    /// 504.
    GatewayTimeout,
    /// Any other non-2xx status.
    HttpError,
    /// Local validation failed before any network call.
    InvalidInput,
    /// Chunking or session-level streaming failure.
    TtsProcessingError,
    /// A single audio payload could not be played.
    PlaybackError,
    /// Missing user identity.
    Unauthenticated,
    /// Anything unclassified.
    UnknownError,
}

impl ErrorCode {
    /// Canonical string form, e.g. `"NETWORK_ERROR"`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout => "TIMEOUT",
            Self::NetworkError => "NETWORK_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::RateLimited => "RATE_LIMITED",
            Self::ServerError => "SERVER_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::GatewayTimeout => "GATEWAY_TIMEOUT",
            Self::HttpError => "HTTP_ERROR",
            Self::InvalidInput => "INVALID_INPUT",
            Self::TtsProcessingError => "TTS_PROCESSING_ERROR",
            Self::PlaybackError => "PLAYBACK_ERROR",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Status reported to the UI when no concrete HTTP status is known.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Timeout | Self::GatewayTimeout => 504,
            Self::NetworkError => 503,
            Self::BadRequest | Self::InvalidInput => 400,
            Self::Unauthorized | Self::Unauthenticated => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::PayloadTooLarge => 413,
            Self::ValidationFailed => 422,
            Self::RateLimited => 429,
            Self::ServiceUnavailable => 503,
            Self::ServerError
            | Self::HttpError
            | Self::TtsProcessingError
            | Self::PlaybackError
            | Self::UnknownError => 500,
        }
    }

    /// Short message suitable for direct display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Timeout | Self::GatewayTimeout => {
                "The request timed out. Please check that the server is reachable and try again."
            }
            Self::NetworkError => {
                "Unable to connect to the server. Please check your internet connection and try again."
            }
            Self::BadRequest | Self::ValidationFailed => {
                "The request was invalid. Please check your input and try again."
            }
            Self::Unauthorized | Self::Unauthenticated => "Sign in required.",
            Self::Forbidden => "You do not have access to this resource.",
            Self::NotFound => "The requested item could not be found.",
            Self::PayloadTooLarge => {
                "File size exceeds the maximum limit. Please upload a smaller file."
            }
            Self::RateLimited => "Daily limit reached. Please try again tomorrow.",
            Self::ServerError | Self::ServiceUnavailable | Self::HttpError => {
                "The server could not complete the request. Please try again later."
            }
            Self::InvalidInput => "Invalid input. Please check the file or text and try again.",
            Self::TtsProcessingError => "Speech could not be generated for this response.",
            Self::PlaybackError => "Audio playback failed; the text is still shown.",
            Self::UnknownError => "Something went wrong. Please try again.",
        }
    }

    /// Maps a backend HTTP status to a code.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            408 => Self::Timeout,
            413 => Self::PayloadTooLarge,
            422 => Self::ValidationFailed,
            429 => Self::RateLimited,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            500..=599 => Self::ServerError,
            _ => Self::HttpError,
        }
    }

    /// Maps a `code` string found in a backend error body, if it is one we know.
    ///
    /// Accepts both the canonical upper-case form and common lower-case aliases.
    pub fn from_backend_code(raw: &str) -> Option<Self> {
        let code = match raw.trim().to_ascii_uppercase().as_str() {
            "TIMEOUT" => Self::Timeout,
            "NETWORK_ERROR" => Self::NetworkError,
            "BAD_REQUEST" | "INVALID_REQUEST" => Self::BadRequest,
            "UNAUTHORIZED" => Self::Unauthorized,
            "FORBIDDEN" | "PERMISSION_DENIED" => Self::Forbidden,
            "NOT_FOUND" => Self::NotFound,
            "PAYLOAD_TOO_LARGE" => Self::PayloadTooLarge,
            "VALIDATION_FAILED" | "VALIDATION_ERROR" => Self::ValidationFailed,
            "RATE_LIMITED" | "RATE_LIMIT_EXCEEDED" => Self::RateLimited,
            "SERVER_ERROR" | "INTERNAL_ERROR" => Self::ServerError,
            "SERVICE_UNAVAILABLE" => Self::ServiceUnavailable,
            "INVALID_INPUT" => Self::InvalidInput,
            "UNAUTHENTICATED" => Self::Unauthenticated,
            "UNKNOWN_ERROR" => Self::UnknownError,
            _ => return None,
        };
        Some(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
