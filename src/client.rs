//! Client for the tutoring backend.
//!
//! [`TutorClient`] owns one pooled HTTP transport and one
//! [`ResilienceState`](crate::state::ResilienceState). Chat and conversation
//! calls live in `conversations`, study questions in `study`.

pub mod builder;
mod conversations;
pub mod core;
mod study;
pub mod types;

pub use builder::TutorClientBuilder;
pub use core::TutorClient;
pub use study::UNKNOWN_CLIENT;
pub use types::{
    AssistantSession, ChatReply, Conversation, Message, Role, StudyAnswer, StudyContent,
};
