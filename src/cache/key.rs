//! Cache key derivation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Characters of source text that participate in a fingerprint.
pub const TEXT_PREFIX_CHARS: usize = 100;

/// Cache key derived from a source-text prefix and the verbatim query:
/// `"{first 100 chars of text}_{query}"`.
///
/// Identical (prefix, query) pairs always produce the same key. Two long
/// texts that share their first 100 characters and are asked the same query
/// also share a key; that is a known limitation of this scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(text: &str, query: &str) -> Self {
        let prefix: String = text.chars().take(TEXT_PREFIX_CHARS).collect();
        Self(format!("{}_{}", prefix, query))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short SHA-256 hex of the key, for log lines that must not carry user text.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        hasher
            .finalize()
            .iter()
            .take(8)
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
