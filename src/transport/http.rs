use crate::config::BackendConfig;
use crate::error_code::ErrorCode;
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use reqwest::{Method, Proxy};
use serde::de::DeserializeOwned;
use std::env;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Longest slice of a non-JSON error body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Request payload for [`HttpTransport::execute_bytes`] and friends.
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(reqwest::multipart::Form),
}

/// Per-call overrides.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Replaces the configured default timeout for this call only.
    pub timeout: Option<Duration>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Timeout-bounded HTTP helper for the tutor backend.
///
/// The deadline covers the whole exchange (send and body read). When it
/// elapses the in-flight future is dropped, which aborts the request and
/// returns the connection to the pool. Failures are classified here, once:
/// `Timeout`, `Network`, or `Http { status, code, message }`.
pub struct HttpTransport {
    client: reqwest::Client,
    config: BackendConfig,
}

impl HttpTransport {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("ryzn-tutor/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(config.request_timeout.min(Duration::from_secs(10)))
            .pool_max_idle_per_host(
                env::var("RYZN_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(16),
            )
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Ok(proxy_url) = env::var("RYZN_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder.build().map_err(|e| Error::Configuration {
            message: format!("failed to create HTTP client: {}", e),
            context: ErrorContext::new().with_source("transport"),
        })?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Execute a call and deserialize the JSON response body.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: &RequestOptions,
    ) -> Result<T> {
        let bytes = self.execute_bytes(method, path, body, options).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Execute a call and return the raw response body of a 2xx response.
    pub async fn execute_bytes(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: &RequestOptions,
    ) -> Result<Bytes> {
        let url = self.config.endpoint(path)?;
        let timeout = options.timeout.unwrap_or(self.config.request_timeout);
        let request_id = Uuid::new_v4().to_string();

        let mut request = self
            .client
            .request(method.clone(), url)
            .header("x-request-id", request_id.as_str());
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        let start = Instant::now();
        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, bytes))
        };

        match tokio::time::timeout(timeout, exchange).await {
            Err(_) => {
                warn!(
                    method = %method,
                    endpoint = path,
                    request_id = request_id.as_str(),
                    timeout_ms = timeout.as_millis() as u64,
                    "ryzn-tutor request timed out"
                );
                Err(Error::Timeout {
                    elapsed: timeout,
                    context: ErrorContext::new()
                        .with_source("transport")
                        .with_details(format!("{} {}", method, path)),
                })
            }
            Ok(Err(e)) => {
                let err = classify_reqwest_error(e, timeout, &method, path);
                warn!(
                    method = %method,
                    endpoint = path,
                    request_id = request_id.as_str(),
                    error_code = err.code().code(),
                    "ryzn-tutor request failed before a response arrived"
                );
                Err(err)
            }
            Ok(Ok((status, bytes))) if status.is_success() => {
                debug!(
                    method = %method,
                    endpoint = path,
                    request_id = request_id.as_str(),
                    http_status = status.as_u16(),
                    bytes = bytes.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "ryzn-tutor request succeeded"
                );
                Ok(bytes)
            }
            Ok(Ok((status, bytes))) => {
                let err = http_error_from_body(status.as_u16(), &bytes);
                info!(
                    method = %method,
                    endpoint = path,
                    request_id = request_id.as_str(),
                    http_status = status.as_u16(),
                    error_code = err.code().code(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "ryzn-tutor request rejected"
                );
                Err(err)
            }
        }
    }
}

fn classify_reqwest_error(e: reqwest::Error, timeout: Duration, method: &Method, path: &str) -> Error {
    let context = ErrorContext::new()
        .with_source("transport")
        .with_details(format!("{} {}", method, path));
    if e.is_timeout() {
        Error::Timeout {
            elapsed: timeout,
            context,
        }
    } else if e.is_builder() {
        Error::Configuration {
            message: e.to_string(),
            context,
        }
    } else {
        Error::network_with_context(e.to_string(), context)
    }
}

/// Build an `Http` error from a non-2xx body.
///
/// The message prefers the FastAPI `detail` field, then `error` or
/// `message`, then the raw body text. The code prefers a recognised `code`
/// field, then the status mapping.
pub(crate) fn http_error_from_body(status: u16, body: &[u8]) -> Error {
    let json: Option<serde_json::Value> = serde_json::from_slice(body).ok();

    let message = json
        .as_ref()
        .and_then(|v| {
            ["detail", "error", "message"]
                .iter()
                .find_map(|key| v.get(*key).filter(|f| !f.is_null()))
                .map(|field| match field.as_str() {
                    Some(s) => s.to_string(),
                    None => field.to_string(),
                })
        })
        .unwrap_or_else(|| {
            String::from_utf8_lossy(body)
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect::<String>()
        });

    let code = json
        .as_ref()
        .and_then(|v| v.get("code"))
        .and_then(|v| v.as_str())
        .and_then(ErrorCode::from_backend_code)
        .unwrap_or_else(|| ErrorCode::from_http_status(status));

    Error::Http {
        status,
        code,
        message,
    }
}
