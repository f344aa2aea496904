//! Chat and conversation management.

use super::core::{finish, require_user, TutorClient};
use super::types::{AssistantSession, ChatReply, Conversation, ConversationList};
use crate::transport::{RequestBody, RequestOptions};
use crate::{Error, Result};
use reqwest::Method;
use serde_json::json;
use tracing::info;

impl TutorClient {
    /// Send one chat message into an existing conversation.
    pub async fn send_message(
        &self,
        content: &str,
        conversation_id: &str,
        user_id: &str,
    ) -> Result<ChatReply> {
        let result: Result<ChatReply> = async {
            let user_id = require_user(user_id)?;
            if content.trim().is_empty() {
                return Err(Error::invalid_input("message is empty"));
            }
            let body = json!({
                "content": content,
                "conversation_id": conversation_id,
                "user_id": user_id,
            });
            self.post_json("send_message", body).await
        }
        .await;
        finish("send_message", result)
    }

    /// Start a tutoring conversation on `topic`.
    pub async fn create_assistant(
        &self,
        topic: &str,
        difficulty_level: &str,
        user_id: &str,
    ) -> Result<AssistantSession> {
        let result: Result<AssistantSession> = async {
            let user_id = require_user(user_id)?;
            let body = json!({
                "topic": topic,
                "difficulty_level": difficulty_level,
                "user_id": user_id,
            });
            let session: AssistantSession = self.post_json("create_assistant", body).await?;
            info!(
                conversation_id = session.conversation_id.as_str(),
                "assistant created"
            );
            Ok(session)
        }
        .await;
        finish("create_assistant", result)
    }

    pub async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let result: Result<Vec<Conversation>> = async {
            let user_id = require_user(user_id)?;
            let path = format!("conversations/{}", path_segment(user_id));
            let options = RequestOptions::new();
            let list: ConversationList = self
                .retry
                .run(|| {
                    self.transport
                        .execute_json(Method::GET, &path, RequestBody::Empty, &options)
                })
                .await?;
            Ok(Vec::from(list))
        }
        .await;
        finish("list_conversations", result)
    }

    pub async fn delete_conversation(&self, conversation_id: &str, user_id: &str) -> Result<()> {
        let result: Result<()> = async {
            let user_id = require_user(user_id)?;
            if conversation_id.trim().is_empty() {
                return Err(Error::invalid_input("conversation id is empty"));
            }
            let path = format!("conversations/{}", path_segment(conversation_id));
            let body = json!({ "user_id": user_id });
            let options = RequestOptions::new();
            self.retry
                .run(|| {
                    self.transport.execute_bytes(
                        Method::DELETE,
                        &path,
                        RequestBody::Json(body.clone()),
                        &options,
                    )
                })
                .await?;
            info!(conversation_id, "conversation deleted");
            Ok(())
        }
        .await;
        finish("delete_conversation", result)
    }

    pub(crate) async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let options = RequestOptions::new();
        self.retry
            .run(|| {
                self.transport
                    .execute_json(Method::POST, path, RequestBody::Json(body.clone()), &options)
            })
            .await
    }
}

/// Percent-encode an identifier for use as a single path segment.
fn path_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
