//! Transport-level failure classification against real sockets.

use ryzn_tutor::resilience::RetryConfig;
use ryzn_tutor::transport::{HttpTransport, RequestBody, RequestOptions};
use ryzn_tutor::{BackendConfig, Error, ErrorCode, TutorClient};
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

#[tokio::test]
async fn test_silent_server_times_out() {
    // Connections complete in the backlog but nothing ever answers.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let config = BackendConfig::new(&url)
        .unwrap()
        .with_health_timeout(Duration::from_millis(200));
    let client = TutorClient::new(config).unwrap();

    let start = Instant::now();
    let err = client.health().await.unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }), "got {:?}", err);
    assert_eq!(err.code(), ErrorCode::Timeout);
    assert_eq!(err.status(), 504);
    assert!(start.elapsed() < Duration::from_secs(2));
    drop(listener);
}

#[tokio::test]
async fn test_per_call_timeout_overrides_default() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let config = BackendConfig::new(&url)
        .unwrap()
        .with_request_timeout(Duration::from_secs(30));
    let transport = HttpTransport::new(&config).unwrap();

    let options = RequestOptions::new().with_timeout(Duration::from_millis(100));
    let start = Instant::now();
    let err = transport
        .execute_bytes(reqwest::Method::GET, "health", RequestBody::Empty, &options)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Timeout);
    assert!(start.elapsed() < Duration::from_secs(5));
    drop(listener);
}

#[tokio::test]
async fn test_closed_port_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = BackendConfig::new(&format!("http://{}", addr))
        .unwrap()
        .with_retry(
            RetryConfig::new()
                .with_max_attempts(2)
                .with_base_delay(Duration::from_millis(1)),
        );
    let client = TutorClient::new(config).unwrap();

    let err = client
        .list_conversations("u1")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network { .. }), "got {:?}", err);
    assert_eq!(err.code(), ErrorCode::NetworkError);
    assert!(err.is_retryable());
}
