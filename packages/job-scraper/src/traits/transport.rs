//! Transport trait: the "send request, receive status/headers/body" seam.
//!
//! The scraper never talks to `reqwest` directly. Everything above this
//! trait (retries, pagination, detail lookups) works against
//! [`HttpTransport`], so tests can swap in a scripted or in-memory backend.
//!
//! ```rust,ignore
//! use job_scraper::traits::transport::{HttpRequest, HttpTransport};
//!
//! let response = transport.send(&HttpRequest::get("https://example.com/job/1")).await?;
//! if response.is_success() {
//!     let payload: serde_json::Value = response.json()?;
//! }
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;

use crate::error::TransportResult;

/// HTTP methods used by the listing and detail endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// A single outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// JSON body, sent with `Content-Type: application/json`
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    /// Create a GET request with no body.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
        }
    }

    /// Create a POST request with a JSON body.
    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body),
        }
    }
}

/// A response as seen by the pipeline: status, headers and the full body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    /// Create a response with no headers.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Add a header (name is lowercased).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }
}

/// Pluggable HTTP transport.
///
/// Implementations only move bytes. A non-2xx status is a successful
/// transport call; classifying it is the executor's job.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request and return whatever the server answered.
    async fn send(&self, request: &HttpRequest) -> TransportResult<HttpResponse>;

    /// Transport name for logs.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    async fn send(&self, request: &HttpRequest) -> TransportResult<HttpResponse> {
        (**self).send(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
