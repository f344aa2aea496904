//! Request and response shapes of the tutoring backend.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Reply to a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub conversation_id: String,
    #[serde(default)]
    pub timestamp: String,
}

/// A freshly created tutoring conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantSession {
    pub conversation_id: String,
    pub topic: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// A stored conversation as listed by `GET /conversations/{user_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(alias = "conversation_id")]
    pub id: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub difficulty_level: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// The backend answers either with a bare array or wrapped in an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ConversationList {
    Bare(Vec<Conversation>),
    Wrapped { conversations: Vec<Conversation> },
}

impl From<ConversationList> for Vec<Conversation> {
    fn from(list: ConversationList) -> Self {
        match list {
            ConversationList::Bare(v) => v,
            ConversationList::Wrapped { conversations } => conversations,
        }
    }
}

/// Material a study question is asked about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StudyContent {
    Text(String),
    Structured {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transcript: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        summary: Option<String>,
    },
}

impl StudyContent {
    pub fn text(text: impl Into<String>) -> Self {
        StudyContent::Text(text.into())
    }

    pub fn structured(
        transcript: Option<String>,
        notes: Option<String>,
        summary: Option<String>,
    ) -> Self {
        StudyContent::Structured {
            transcript,
            notes,
            summary,
        }
    }

    /// Text the cache fingerprint is taken from: plain text as-is,
    /// structured content as compact JSON.
    pub fn fingerprint_source(&self) -> Cow<'_, str> {
        match self {
            StudyContent::Text(text) => Cow::Borrowed(text),
            structured => Cow::Owned(serde_json::to_string(structured).unwrap_or_default()),
        }
    }
}

impl Default for StudyContent {
    fn default() -> Self {
        StudyContent::Text(String::new())
    }
}

impl From<&str> for StudyContent {
    fn from(text: &str) -> Self {
        StudyContent::Text(text.to_string())
    }
}

impl From<String> for StudyContent {
    fn from(text: String) -> Self {
        StudyContent::Text(text)
    }
}

/// Answer from `POST /api/response`.
///
/// Only `response` has a fixed meaning; other fields the backend returns are
/// kept in `extra` so a cached answer is identical to a fresh one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StudyAnswer {
    /// The answer text, from `response` or else a string `answer` field.
    pub fn text(&self) -> Option<&str> {
        self.response
            .as_deref()
            .or_else(|| self.extra.get("answer").and_then(|v| v.as_str()))
    }
}
