//! Questions about uploaded study material.

use super::core::{finish, TutorClient};
use super::types::{StudyAnswer, StudyContent};
use crate::cache::{Fingerprint, ResponseCache};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

/// Identity used when the caller cannot name the client.
pub const UNKNOWN_CLIENT: &str = "unknown";

impl TutorClient {
    /// Ask `query` about `content` via `POST /api/response`.
    ///
    /// The call first counts against `client_id`'s daily quota, then is
    /// answered from the response cache when an identical question was
    /// answered within the TTL. Only successful answers are cached.
    pub async fn ask(
        &self,
        client_id: &str,
        content: &StudyContent,
        query: &str,
    ) -> Result<StudyAnswer> {
        let result: Result<StudyAnswer> = async {
            if query.trim().is_empty() {
                return Err(Error::invalid_input("question is empty"));
            }
            let client_id = match client_id.trim() {
                "" => UNKNOWN_CLIENT,
                id => id,
            };
            self.state.limiter().enforce(client_id)?;

            let key = Fingerprint::new(&content.fingerprint_source(), query);
            if let Some(answer) = self.state.cache().get::<StudyAnswer>(&key) {
                debug!(key = key.digest().as_str(), "answered from cache");
                return Ok(answer);
            }

            let body = json!({
                "content": content,
                "user_query": query,
            });
            let answer: StudyAnswer = self.post_json("api/response", body).await?;
            let cached = remember(self.state.cache(), &key, &answer);
            info!(key = key.digest().as_str(), cached, "study answer fetched");
            Ok(answer)
        }
        .await;
        finish("ask", result)
    }
}

/// Cache a fetched answer. A failure here never fails the call that
/// produced the answer.
fn remember<T: Serialize>(cache: &ResponseCache, key: &Fingerprint, value: &T) -> bool {
    match cache.put(key.clone(), value) {
        Ok(()) => true,
        Err(e) => {
            warn!(
                key = key.digest().as_str(),
                error_code = e.code().code(),
                "could not cache answer: {}",
                e
            );
            false
        }
    }
}
