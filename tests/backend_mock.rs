//! Backend client behaviour against a mock HTTP server.

mod common;

use common::MockBackend;
use mockito::Matcher;
use ryzn_tutor::cache::CacheConfig;
use ryzn_tutor::client::{Role, StudyContent};
use ryzn_tutor::resilience::RateLimiterConfig;
use ryzn_tutor::stt::AudioUpload;
use ryzn_tutor::tts::{AudioFormat, TtsOptions};
use ryzn_tutor::{Error, ErrorCode};
use serde_json::json;

#[tokio::test]
async fn test_tts_returns_audio_bytes() {
    let mut backend = MockBackend::new().await;
    let mock = backend
        .server
        .mock("POST", "/text_to_speech")
        .match_body(Matcher::PartialJson(json!({
            "text": "Hello there.",
            "response_format": "mp3",
            "voice": "alloy",
        })))
        .with_status(200)
        .with_header("content-type", "audio/mpeg")
        .with_body(vec![0xFFu8, 0xFB, 0x90, 0x00])
        .expect(1)
        .create_async()
        .await;

    let audio = backend
        .client
        .tts()
        .synthesize("Hello there.", &TtsOptions::new().with_voice("alloy"))
        .await
        .unwrap();

    assert_eq!(audio.format, AudioFormat::Mp3);
    assert_eq!(audio.data.as_ref(), &[0xFF, 0xFB, 0x90, 0x00]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mut backend = MockBackend::new().await;
    let mock = backend
        .server
        .mock("POST", "/text_to_speech")
        .with_status(422)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "text must not exceed 4096 characters"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = backend
        .client
        .tts()
        .synthesize("Too long.", &TtsOptions::new())
        .await
        .unwrap_err();

    match &err {
        Error::Http {
            status, message, ..
        } => {
            assert_eq!(*status, 422);
            assert_eq!(message, "text must not exceed 4096 characters");
        }
        other => panic!("expected Http error, got {:?}", other),
    }
    assert_eq!(err.code(), ErrorCode::ValidationFailed);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_not_found_attempted_once() {
    let mut backend = MockBackend::new().await;
    let mock = backend
        .server
        .mock("GET", "/conversations/u1")
        .with_status(404)
        .with_body(r#"{"detail": "user not found"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = backend.client.list_conversations("u1").await.unwrap_err();
    assert_eq!(err.status(), 404);
    assert_eq!(err.code(), ErrorCode::NotFound);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_retried_to_the_limit() {
    let mut backend = MockBackend::new().await;
    let mock = backend
        .server
        .mock("POST", "/text_to_speech")
        .with_status(500)
        .with_body("upstream exploded")
        .expect(3)
        .create_async()
        .await;

    let err = backend
        .client
        .tts()
        .synthesize("Hi.", &TtsOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.status(), 500);
    assert!(err.to_string().contains("upstream exploded"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_backend_rate_limit_is_retried() {
    let mut backend = MockBackend::new().await;
    let mock = backend
        .server
        .mock("POST", "/send_message")
        .with_status(429)
        .with_body(r#"{"detail": "slow down"}"#)
        .expect(3)
        .create_async()
        .await;

    let err = backend
        .client
        .send_message("hi", "c1", "u1")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::RateLimited);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_send_message() {
    let mut backend = MockBackend::new().await;
    let mock = backend
        .server
        .mock("POST", "/send_message")
        .match_body(Matcher::Json(json!({
            "content": "What is a derivative?",
            "conversation_id": "c1",
            "user_id": "u1",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "response": "The rate of change of a function.",
                "conversation_id": "c1",
                "timestamp": "2026-03-01T10:00:00Z",
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let reply = backend
        .client
        .send_message("What is a derivative?", "c1", "u1")
        .await
        .unwrap();
    assert_eq!(reply.response, "The rate of change of a function.");
    assert_eq!(reply.conversation_id, "c1");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_blank_user_is_unauthenticated_without_a_request() {
    let mut backend = MockBackend::new().await;
    let mock = backend
        .server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = backend
        .client
        .send_message("hi", "c1", "  ")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthenticated { .. }));
    assert_eq!(err.status(), 401);
    assert_eq!(err.payload().message, "Sign in required.");

    let err = backend.client.create_assistant("Algebra", "easy", "").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::Unauthenticated);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_list_and_delete_conversation() {
    let mut backend = MockBackend::new().await;
    let create = backend
        .server
        .mock("POST", "/create_assistant")
        .match_body(Matcher::Json(json!({
            "topic": "Cell biology",
            "difficulty_level": "intermediate",
            "user_id": "u1",
        })))
        .with_status(200)
        .with_body(r#"{"conversation_id": "c42", "topic": "Cell biology"}"#)
        .create_async()
        .await;
    let list = backend
        .server
        .mock("GET", "/conversations/u1")
        .with_status(200)
        .with_body(
            json!([{
                "id": "c42",
                "topic": "Cell biology",
                "difficulty_level": "intermediate",
                "messages": [
                    {"role": "user", "content": "What is a ribosome?"},
                    {"role": "assistant", "content": "A protein factory."}
                ],
                "created_at": "2026-03-01T10:00:00Z",
                "updated_at": "2026-03-01T10:05:00Z"
            }])
            .to_string(),
        )
        .create_async()
        .await;
    let delete = backend
        .server
        .mock("DELETE", "/conversations/c42")
        .match_body(Matcher::Json(json!({"user_id": "u1"})))
        .with_status(200)
        .with_body(r#"{"status": "deleted"}"#)
        .expect(1)
        .create_async()
        .await;

    let session = backend
        .client
        .create_assistant("Cell biology", "intermediate", "u1")
        .await
        .unwrap();
    assert_eq!(session.conversation_id, "c42");

    let conversations = backend.client.list_conversations("u1").await.unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].messages[1].role, Role::Assistant);

    backend
        .client
        .delete_conversation(&session.conversation_id, "u1")
        .await
        .unwrap();

    create.assert_async().await;
    list.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn test_ask_is_served_from_cache() {
    let mut backend = MockBackend::new().await;
    let mock = backend
        .server
        .mock("POST", "/api/response")
        .match_body(Matcher::Json(json!({
            "content": "Glycolysis splits glucose into pyruvate.",
            "user_query": "Where does glycolysis happen?",
        })))
        .with_status(200)
        .with_body(r#"{"response": "In the cytoplasm."}"#)
        .expect(1)
        .create_async()
        .await;

    let content = StudyContent::text("Glycolysis splits glucose into pyruvate.");
    for _ in 0..2 {
        let answer = backend
            .client
            .ask("10.0.0.1", &content, "Where does glycolysis happen?")
            .await
            .unwrap();
        assert_eq!(answer.text(), Some("In the cytoplasm."));
    }

    let stats = backend.client.state().cache().stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.puts, 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_uncacheable_answer_is_still_returned() {
    let mut backend = MockBackend::with_config(|cfg| {
        cfg.with_cache(CacheConfig::new().with_max_entry_size(8))
    })
    .await;
    let mock = backend
        .server
        .mock("POST", "/api/response")
        .with_status(200)
        .with_body(r#"{"response": "A long explanation of the Krebs cycle."}"#)
        .expect(2)
        .create_async()
        .await;

    let content = StudyContent::text("Chapter 4");
    for _ in 0..2 {
        let answer = backend
            .client
            .ask("10.0.0.2", &content, "Explain the Krebs cycle")
            .await
            .unwrap();
        assert_eq!(answer.text(), Some("A long explanation of the Krebs cycle."));
    }
    assert_eq!(backend.client.state().cache().stats().puts, 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_ask_structured_content_is_sent_as_object() {
    let mut backend = MockBackend::new().await;
    let mock = backend
        .server
        .mock("POST", "/api/response")
        .match_body(Matcher::Json(json!({
            "content": {"transcript": "lecture text", "notes": "key points"},
            "user_query": "Summarize",
        })))
        .with_status(200)
        .with_body(r#"{"response": "Short summary."}"#)
        .expect(1)
        .create_async()
        .await;

    let content = StudyContent::structured(
        Some("lecture text".to_string()),
        Some("key points".to_string()),
        None,
    );
    let answer = backend.client.ask("c", &content, "Summarize").await.unwrap();
    assert_eq!(answer.text(), Some("Short summary."));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_ask_quota_is_enforced_before_the_network() {
    let mut backend = MockBackend::with_config(|cfg| {
        cfg.with_rate_limit(RateLimiterConfig::new().with_quota(2))
    })
    .await;
    let mock = backend
        .server
        .mock("POST", "/api/response")
        .with_status(200)
        .with_body(r#"{"response": "ok"}"#)
        .expect(2)
        .create_async()
        .await;

    let content = StudyContent::text("notes");
    backend.client.ask("1.2.3.4", &content, "q1").await.unwrap();
    backend.client.ask("1.2.3.4", &content, "q2").await.unwrap();
    let err = backend
        .client
        .ask("1.2.3.4", &content, "q3")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RateLimited { .. }));
    assert_eq!(err.status(), 429);
    assert!(err.to_string().contains("daily limit reached"));
    assert_eq!(
        err.payload().message,
        "Daily limit reached. Please try again tomorrow."
    );

    // Another client still has its quota; its question is already cached.
    backend.client.ask("5.6.7.8", &content, "q1").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_failed_answers_are_not_cached() {
    let mut backend = MockBackend::new().await;
    let mock = backend
        .server
        .mock("POST", "/api/response")
        .with_status(400)
        .with_body(r#"{"detail": "missing content"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = backend
        .client
        .ask("c", &StudyContent::default(), "anything")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::BadRequest);
    assert!(backend.client.state().cache().is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_transcribe_uploads_multipart() {
    let mut backend = MockBackend::new().await;
    let mock = backend
        .server
        .mock("POST", "/transcribe_audio")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data".to_string()),
        )
        .match_body(Matcher::Regex(r#"name="file"; filename="recording.webm""#.to_string()))
        .with_status(200)
        .with_body(r#"{"text": "photosynthesis needs light"}"#)
        .expect(1)
        .create_async()
        .await;

    let upload = AudioUpload::new(vec![1u8, 2, 3, 4], "audio/webm");
    let transcription = backend.client.transcribe(&upload).await.unwrap();
    assert_eq!(transcription.text, "photosynthesis needs light");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_transcribe_rejects_bad_input_locally() {
    let mut backend = MockBackend::new().await;
    let mock = backend
        .server
        .mock("POST", "/transcribe_audio")
        .expect(0)
        .create_async()
        .await;

    let empty = AudioUpload::new(Vec::<u8>::new(), "audio/wav");
    let err = backend.client.transcribe(&empty).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidInput);

    let video = AudioUpload::new(vec![1u8], "video/mp4");
    let err = backend.client.transcribe(&video).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidInput);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_health() {
    let mut backend = MockBackend::new().await;
    let mock = backend
        .server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(r#"{"status": "ok"}"#)
        .expect(1)
        .create_async()
        .await;
    backend.client.health().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unhealthy_backend_is_not_retried() {
    let mut backend = MockBackend::new().await;
    let mock = backend
        .server
        .mock("GET", "/health")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    let err = backend.client.health().await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_json_success_body_is_unknown_error() {
    let mut backend = MockBackend::with_config(|cfg| {
        cfg.with_retry(ryzn_tutor::resilience::RetryConfig::new().with_max_attempts(1))
    })
    .await;
    let _mock = backend
        .server
        .mock("POST", "/create_assistant")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let err = backend
        .client
        .create_assistant("Algebra", "easy", "u1")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnknownError);
    assert_eq!(err.status(), 500);
}
