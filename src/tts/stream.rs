//! Sentence-by-sentence speech streaming.
//!
//! [`TtsStreamer`] splits text into speech units and, for each unit in order,
//! requests audio, plays it, and reveals the unit's text through a callback.
//! A unit whose audio cannot be fetched or played is still revealed; the
//! session carries on with the next unit and the failure is recorded in the
//! [`StreamReport`].
//!
//! Units never overlap: unit `i + 1` is not requested until unit `i` has
//! finished playing and the inter-unit delay has passed.

use super::chunker::chunk_text;
use super::player::AudioPlayer;
use super::types::{AudioOutput, TtsOptions};
use crate::config::BackendConfig;
use crate::error_code::ErrorCode;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Source of audio for one speech unit.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, options: &TtsOptions) -> Result<AudioOutput>;
}

/// Where a streaming session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Chunking,
    Requesting,
    Playing,
    Advancing,
    Done,
}

/// When a unit's text is handed to the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealTiming {
    /// After the unit's audio finished (or failed).
    #[default]
    AfterAudio,
    /// Before the unit's audio is requested.
    BeforeAudio,
}

#[derive(Debug, Clone)]
pub struct StreamOptions {
    pub tts: TtsOptions,
    /// Pause between units. Not applied after the last one.
    pub unit_delay: Duration,
    pub reveal: RevealTiming,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            tts: TtsOptions::default(),
            unit_delay: Duration::from_millis(50),
            reveal: RevealTiming::default(),
        }
    }
}

impl StreamOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::default().with_unit_delay(config.tts_chunk_delay)
    }

    pub fn with_tts(mut self, tts: TtsOptions) -> Self {
        self.tts = tts;
        self
    }

    pub fn with_unit_delay(mut self, delay: Duration) -> Self {
        self.unit_delay = delay;
        self
    }

    pub fn with_reveal(mut self, reveal: RevealTiming) -> Self {
        self.reveal = reveal;
        self
    }
}

/// A unit that was shown without audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedUnit {
    pub index: usize,
    pub code: ErrorCode,
    pub message: String,
}

/// Outcome of one streaming session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamReport {
    /// Units the text was split into.
    pub units: usize,
    /// Units whose audio played to the end.
    pub spoken: usize,
    pub degraded: Vec<DegradedUnit>,
    /// True if the session stopped early on cancellation.
    pub cancelled: bool,
    /// Text revealed to the callback, in full.
    pub displayed: String,
}

impl StreamReport {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

struct Session {
    state: PlaybackState,
    index: usize,
    displayed: String,
}

impl Session {
    fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
            index: 0,
            displayed: String::new(),
        }
    }

    fn enter(&mut self, state: PlaybackState) {
        debug!(unit = self.index, from = ?self.state, to = ?state, "tts state");
        self.state = state;
    }

    fn reveal<F: FnMut(&str)>(&mut self, text: &str, on_text: &mut F) {
        self.displayed.push_str(text);
        on_text(&self.displayed);
    }
}

/// Drives synthesis and playback of a text, one speech unit at a time.
pub struct TtsStreamer<S, P> {
    synthesizer: S,
    player: P,
    options: StreamOptions,
}

impl<S: SpeechSynthesizer, P: AudioPlayer> TtsStreamer<S, P> {
    pub fn new(synthesizer: S, player: P) -> Self {
        Self {
            synthesizer,
            player,
            options: StreamOptions::default(),
        }
    }

    pub fn with_options(mut self, options: StreamOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &StreamOptions {
        &self.options
    }

    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// Stream `text` to completion. See [`stream_with_cancel`](Self::stream_with_cancel).
    pub async fn stream<F>(&self, text: &str, on_text: F) -> Result<StreamReport>
    where
        F: FnMut(&str),
    {
        self.stream_with_cancel(text, on_text, &CancellationToken::new())
            .await
    }

    /// Stream `text`, calling `on_text` with the cumulative revealed text
    /// once per unit.
    ///
    /// `cancel` is checked before each unit starts and during the pause
    /// between units. An in-flight request or playback is never interrupted.
    ///
    /// Empty `text` finishes at once with an empty report. Text made only of
    /// whitespace fails with `TtsProcessing`; per-unit audio failures are
    /// reported in [`StreamReport::degraded`].
    pub async fn stream_with_cancel<F>(
        &self,
        text: &str,
        mut on_text: F,
        cancel: &CancellationToken,
    ) -> Result<StreamReport>
    where
        F: FnMut(&str),
    {
        let mut session = Session::new();
        session.enter(PlaybackState::Chunking);

        if text.is_empty() {
            session.enter(PlaybackState::Done);
            return Ok(StreamReport::default());
        }
        if text.trim().is_empty() {
            session.enter(PlaybackState::Done);
            return Err(Error::tts_with_context(
                "nothing to speak: input text is blank",
                ErrorContext::new().with_source("tts_stream"),
            ));
        }

        let chunks = chunk_text(text);
        let total = chunks.len();
        info!(units = total, rule = ?chunks.rule(), "tts stream started");

        let mut report = StreamReport {
            units: total,
            ..StreamReport::default()
        };

        for unit in chunks {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            session.index = unit.index;

            if self.options.reveal == RevealTiming::BeforeAudio {
                session.reveal(&unit.text, &mut on_text);
            }

            session.enter(PlaybackState::Requesting);
            let outcome = match self.synthesizer.synthesize(&unit.text, &self.options.tts).await {
                Ok(audio) => {
                    session.enter(PlaybackState::Playing);
                    self.player.play(&audio).await
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => report.spoken += 1,
                Err(e) => {
                    warn!(
                        unit = unit.index,
                        error_code = e.code().code(),
                        "audio unavailable for unit, showing text only: {}",
                        e
                    );
                    report.degraded.push(DegradedUnit {
                        index: unit.index,
                        code: e.code(),
                        message: e.to_string(),
                    });
                }
            }

            session.enter(PlaybackState::Advancing);
            if self.options.reveal == RevealTiming::AfterAudio {
                session.reveal(&unit.text, &mut on_text);
            }

            let is_last = unit.index + 1 >= total;
            if !is_last && !self.options.unit_delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        report.cancelled = true;
                        break;
                    }
                    _ = tokio::time::sleep(self.options.unit_delay) => {}
                }
            }
        }

        session.enter(PlaybackState::Done);
        report.displayed = session.displayed;
        info!(
            units = report.units,
            spoken = report.spoken,
            degraded = report.degraded.len(),
            cancelled = report.cancelled,
            "tts stream finished"
        );
        Ok(report)
    }
}
