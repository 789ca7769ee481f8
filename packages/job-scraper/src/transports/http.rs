//! `reqwest`-backed transport.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{ScrapeError, TransportError, TransportResult};
use crate::traits::transport::{HttpRequest, HttpResponse, HttpTransport, Method};
use crate::types::config::ScraperConfig;

/// Transport that sends real requests through a shared `reqwest::Client`.
///
/// Headers and the timeout are fixed when the client is built, so every
/// request carries the same browser-like identity.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client from the scraper configuration.
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(
            "x-requested-with",
            HeaderValue::from_static("XMLHttpRequest"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| ScrapeError::TransportSetup(format!("user agent: {e}")))?,
        );
        headers.insert(
            REFERER,
            HeaderValue::from_str(&config.site_url)
                .map_err(|e| ScrapeError::TransportSetup(format!("referer: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ScrapeError::TransportSetup(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wrap an existing client as-is.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> TransportResult<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(TransportError::from)?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response.text().await.map_err(TransportError::from)?;

        debug!(url = %request.url, status, body_len = body.len(), "HTTP response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn name(&self) -> &str {
        "reqwest"
    }
}
