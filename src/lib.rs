//! # ryzn-tutor
//!
//! Client runtime for the Ryzn tutoring backend: sentence-by-sentence speech
//! streaming, transcription, chat, and study questions, with the resilience
//! pieces those calls need.
//!
//! ## Overview
//!
//! Every backend call goes through one [`transport::HttpTransport`], which
//! bounds it with a timeout and turns failures into one closed [`Error`]
//! type. Calls are retried with exponential backoff where a retry can help.
//! Study questions are additionally rate limited per client and cached.
//!
//! Speech is streamed one unit at a time: text is split at sentence
//! boundaries, each unit is synthesized and played before the next one is
//! requested, and the text is revealed alongside the audio. A unit whose
//! audio fails is still shown, so a flaky TTS backend never hides the
//! transcript.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ryzn_tutor::tts::SilentPlayer;
//! use ryzn_tutor::TutorClient;
//!
//! #[tokio::main]
//! async fn main() -> ryzn_tutor::Result<()> {
//!     let client = TutorClient::from_env()?;
//!     client.health().await?;
//!
//!     let streamer = client.streamer(SilentPlayer);
//!     let report = streamer
//!         .stream("Mitochondria make ATP. They have two membranes.", |shown| {
//!             println!("{}", shown);
//!         })
//!         .await?;
//!     println!("{} of {} units spoken", report.spoken, report.units);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Backend client, builder, and request/response types |
//! | [`tts`] | Chunking, synthesis, playback, and streaming |
//! | [`stt`] | Audio transcription |
//! | [`transport`] | HTTP execution with timeouts and error classification |
//! | [`resilience`] | Retry policy and fixed-window rate limiter |
//! | [`cache`] | TTL-bounded response cache |
//! | [`state`] | Shared cache and limiter with a sweep lifecycle |
//! | [`config`] | Environment-driven configuration |

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod error_code;
pub mod resilience;
pub mod state;
pub mod stt;
pub mod transport;
pub mod tts;

pub use client::{TutorClient, TutorClientBuilder};
pub use config::BackendConfig;
pub use error::{Error, ErrorContext, ErrorPayload};
pub use error_code::ErrorCode;
pub use state::{ResilienceState, SweeperHandle};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;
