//! Speech-to-text through the backend's `/transcribe_audio` endpoint.

mod client;
mod types;

pub use client::SttClient;
pub use types::{AudioUpload, Transcription};
