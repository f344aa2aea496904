//! Audio playback.

use super::types::AudioOutput;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use std::io::Write;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::debug;

/// Plays one synthesized payload to completion.
///
/// `play` resolves when playback ends naturally and fails with
/// [`Error::Playback`] on decoding or device errors. Implementations release
/// any temporary resources before returning, on success and on failure.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, audio: &AudioOutput) -> Result<()>;
}

/// Plays audio through an external command-line player.
///
/// The payload is written to a temporary file that is removed when `play`
/// returns.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandPlayer {
    /// `program` is invoked as `program [args..] <file>`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `afplay` on macOS, `ffplay` elsewhere.
    pub fn system_default() -> Self {
        if cfg!(target_os = "macos") {
            Self::new("afplay", Vec::new())
        } else {
            Self::new(
                "ffplay",
                ["-nodisp", "-autoexit", "-loglevel", "quiet"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            )
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn context(&self) -> ErrorContext {
        ErrorContext::new().with_source(format!("player:{}", self.program))
    }
}

impl Default for CommandPlayer {
    fn default() -> Self {
        Self::system_default()
    }
}

#[async_trait]
impl AudioPlayer for CommandPlayer {
    async fn play(&self, audio: &AudioOutput) -> Result<()> {
        if audio.is_empty() {
            return Err(Error::playback_with_context(
                "empty audio payload",
                self.context(),
            ));
        }

        // Temp file creation and the write are blocking filesystem calls.
        let data = audio.data.clone();
        let suffix = format!(".{}", audio.format.as_str());
        let file = tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
            let mut file = tempfile::Builder::new()
                .prefix("ryzn-tts-")
                .suffix(&suffix)
                .tempfile()?;
            file.write_all(&data)?;
            file.flush()?;
            Ok(file)
        })
        .await
        .map_err(|e| {
            Error::playback_with_context(format!("audio staging task failed: {}", e), self.context())
        })?
        .map_err(|e| {
            Error::playback_with_context(format!("write audio file: {}", e), self.context())
        })?;

        debug!(
            program = self.program.as_str(),
            bytes = audio.data.len(),
            format = audio.format.as_str(),
            "starting playback"
        );

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(file.path())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| {
                Error::playback_with_context(
                    format!("failed to start {}: {}", self.program, e),
                    self.context(),
                )
            })?;

        if !status.success() {
            return Err(Error::playback_with_context(
                format!("{} exited with {}", self.program, status),
                self.context(),
            ));
        }
        Ok(())
    }
}

/// Discards audio. Used for text-only streaming.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentPlayer;

#[async_trait]
impl AudioPlayer for SilentPlayer {
    async fn play(&self, _audio: &AudioOutput) -> Result<()> {
        Ok(())
    }
}
