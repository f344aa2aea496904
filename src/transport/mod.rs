//! HTTP transport for the tutor backend.

mod http;

pub use http::{HttpTransport, RequestBody, RequestOptions};
