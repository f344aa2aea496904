//! STT (Speech-to-Text) types.

use serde::{Deserialize, Serialize};

/// Transcription result from the backend.
///
/// Older deployments answer with `transcript` instead of `text`, and may
/// attach generated study `notes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcription {
    #[serde(alias = "transcript")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One audio file to transcribe.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub data: bytes::Bytes,
    /// MIME type; must be `audio/*`.
    pub mime_type: String,
    pub file_name: String,
}

impl AudioUpload {
    pub fn new(data: impl Into<bytes::Bytes>, mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        let file_name = format!("recording.{}", extension_for(&mime_type));
        Self {
            data: data.into(),
            mime_type,
            file_name,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }
}

fn extension_for(mime: &str) -> &'static str {
    let essence = mime.split(';').next().unwrap_or("").trim();
    match essence {
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/webm" => "webm",
        "audio/ogg" => "ogg",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
        "audio/flac" => "flac",
        _ => "mp3",
    }
}
