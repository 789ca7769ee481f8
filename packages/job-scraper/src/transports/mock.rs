//! Mock transport for testing.
//!
//! Replies are scripted per `(method, url)`. Each call pops the next reply;
//! the last one repeats once the script runs out. Unscripted URLs get a 404.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use crate::error::{TransportError, TransportResult};
use crate::traits::transport::{HttpRequest, HttpResponse, HttpTransport, Method};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with this status and body
    Status(u16, String),
    /// Fail at the transport layer
    Error(TransportError),
}

impl MockReply {
    /// 200 with a JSON body.
    pub fn json(value: serde_json::Value) -> Self {
        MockReply::Status(200, value.to_string())
    }

    pub fn status(status: u16) -> Self {
        MockReply::Status(status, String::new())
    }

    pub fn timeout() -> Self {
        MockReply::Error(TransportError::Timeout)
    }

    pub fn connection_refused() -> Self {
        MockReply::Error(TransportError::Connection("connection refused".into()))
    }
}

/// Scripted transport.
///
/// # Example
///
/// ```rust
/// use job_scraper::transports::{MockReply, MockTransport, Method};
///
/// let mock = MockTransport::new()
///     .with_replies(
///         Method::Get,
///         "https://example.com/job",
///         vec![MockReply::timeout(), MockReply::json(serde_json::json!({}))],
///     );
/// assert_eq!(mock.call_count(), 0);
/// ```
#[derive(Default)]
pub struct MockTransport {
    scripts: Arc<RwLock<HashMap<(Method, String), VecDeque<MockReply>>>>,
    calls: Arc<RwLock<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append replies for a route.
    pub fn add_replies(&self, method: Method, url: impl Into<String>, replies: Vec<MockReply>) {
        let mut scripts = self.scripts.write().unwrap();
        scripts
            .entry((method, url.into()))
            .or_default()
            .extend(replies);
    }

    /// Builder form of [`add_replies`](Self::add_replies).
    pub fn with_replies(
        self,
        method: Method,
        url: impl Into<String>,
        replies: Vec<MockReply>,
    ) -> Self {
        self.add_replies(method, url, replies);
        self
    }

    /// Every request seen so far, in order.
    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Requests seen for one URL.
    pub fn calls_to(&self, url: &str) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.url == url)
            .count()
    }

    pub fn reset_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    fn next_reply(&self, request: &HttpRequest) -> Option<MockReply> {
        let mut scripts = self.scripts.write().unwrap();
        let queue = scripts.get_mut(&(request.method, request.url.clone()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Clone for MockTransport {
    fn clone(&self) -> Self {
        Self {
            scripts: Arc::clone(&self.scripts),
            calls: Arc::clone(&self.calls),
        }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: &HttpRequest) -> TransportResult<HttpResponse> {
        self.calls.write().unwrap().push(request.clone());

        match self.next_reply(request) {
            Some(MockReply::Status(status, body)) => Ok(HttpResponse::new(status, body)),
            Some(MockReply::Error(err)) => Err(err),
            None => Ok(HttpResponse::new(404, "not found")),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_order_and_repeat() {
        let url = "https://example.com/a";
        let mock = MockTransport::new().with_replies(
            Method::Get,
            url,
            vec![MockReply::timeout(), MockReply::status(200)],
        );
        let request = HttpRequest::get(url);

        assert_eq!(mock.send(&request).await, Err(TransportError::Timeout));
        assert_eq!(mock.send(&request).await.unwrap().status, 200);
        assert_eq!(mock.send(&request).await.unwrap().status, 200);
        assert_eq!(mock.calls_to(url), 3);
    }

    #[tokio::test]
    async fn test_unscripted_route_is_404() {
        let mock = MockTransport::new();
        let response = mock
            .send(&HttpRequest::get("https://example.com/missing"))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_method_is_part_of_route() {
        let url = "https://example.com/jobs";
        let mock = MockTransport::new().with_replies(Method::Post, url, vec![MockReply::status(200)]);

        let get = mock.send(&HttpRequest::get(url)).await.unwrap();
        let post = mock
            .send(&HttpRequest::post_json(url, serde_json::json!({})))
            .await
            .unwrap();

        assert_eq!(get.status, 404);
        assert_eq!(post.status, 200);
    }
}
