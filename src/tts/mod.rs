//! Text-to-speech: chunking, synthesis, playback and the streaming loop
//! that ties them together.
//!
//! ## Example
//!
//! ```rust
//! use ryzn_tutor::tts::{chunk_text, ChunkRule};
//!
//! let chunks = chunk_text("Hello there. How are you? I am fine.");
//! assert_eq!(chunks.rule(), ChunkRule::Sentence);
//! assert_eq!(chunks.texts(), vec!["Hello there. ", "How are you? ", "I am fine."]);
//! ```

mod chunker;
mod client;
mod player;
mod stream;
mod types;

pub use chunker::{chunk_text, ChunkRule, Chunks, SpeechUnit};
pub use client::TtsClient;
pub use player::{AudioPlayer, CommandPlayer, SilentPlayer};
pub use stream::{
    DegradedUnit, PlaybackState, RevealTiming, SpeechSynthesizer, StreamOptions, StreamReport,
    TtsStreamer,
};
pub use types::{AudioFormat, AudioOutput, TtsOptions};
