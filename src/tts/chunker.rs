//! Splitting text into speech units.
//!
//! Text is cut after sentence terminators (`.`, `!`, `?`) that are followed by
//! whitespace or the end of the text. Text with no sentence boundary is cut
//! after commas instead, and text with neither is spoken as one unit.
//!
//! The whitespace after a terminator stays with the unit before it, so the
//! units always concatenate back to the input byte-for-byte.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|$)").expect("sentence pattern is valid"));

static CLAUSE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",(?:\s+|$)").expect("clause pattern is valid"));

/// Which rule produced a [`Chunks`] sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkRule {
    Sentence,
    Clause,
    Whole,
}

/// One independently synthesized fragment of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechUnit {
    pub index: usize,
    pub text: String,
    /// Byte range of `text` in the source.
    pub range: Range<usize>,
}

/// Ordered units of one input text. Consumed by iteration.
#[derive(Debug, Clone)]
pub struct Chunks {
    rule: ChunkRule,
    units: Vec<SpeechUnit>,
}

impl Chunks {
    pub fn rule(&self) -> ChunkRule {
        self.rule
    }

    pub fn units(&self) -> &[SpeechUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.text.as_str()).collect()
    }
}

impl IntoIterator for Chunks {
    type Item = SpeechUnit;
    type IntoIter = std::vec::IntoIter<SpeechUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.into_iter()
    }
}

/// Split `text` into speech units.
///
/// Empty input yields no units. Any other input yields at least one.
pub fn chunk_text(text: &str) -> Chunks {
    if text.is_empty() {
        return Chunks {
            rule: ChunkRule::Whole,
            units: Vec::new(),
        };
    }

    let (rule, ranges) = if let Some(ranges) = split_after(text, &SENTENCE_END) {
        (ChunkRule::Sentence, ranges)
    } else if let Some(ranges) = split_after(text, &CLAUSE_END) {
        (ChunkRule::Clause, ranges)
    } else {
        (ChunkRule::Whole, vec![0..text.len()])
    };

    let units = ranges
        .into_iter()
        .enumerate()
        .map(|(index, range)| SpeechUnit {
            index,
            text: text[range.clone()].to_string(),
            range,
        })
        .collect();

    Chunks { rule, units }
}

/// Byte ranges ending at each accepted match of `boundary`, plus the
/// remainder. `None` when no match was accepted.
///
/// A match that starts at the cursor would close an empty unit, so it is
/// skipped and its text becomes the start of the next unit.
fn split_after(text: &str, boundary: &Regex) -> Option<Vec<Range<usize>>> {
    let mut ranges = Vec::new();
    let mut cursor = 0;

    for m in boundary.find_iter(text) {
        if m.start() > cursor {
            ranges.push(cursor..m.end());
            cursor = m.end();
        }
    }

    if ranges.is_empty() {
        return None;
    }
    if cursor < text.len() {
        ranges.push(cursor..text.len());
    }
    Some(ranges)
}
