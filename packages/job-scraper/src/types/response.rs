//! Invocation event and response envelope.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::ScrapeError;
use crate::types::record::CanonicalRecord;

fn default_max_jobs() -> Option<usize> {
    Some(100)
}

fn default_include_details() -> bool {
    true
}

/// Parameters of one invocation.
///
/// A missing `max_jobs` means 100; an explicit `null` means no cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeEvent {
    #[serde(default = "default_max_jobs")]
    pub max_jobs: Option<usize>,

    #[serde(default = "default_include_details")]
    pub include_details: bool,

    /// Overall time budget; on expiry partial results are returned
    #[serde(default)]
    pub time_budget_secs: Option<u64>,
}

impl Default for ScrapeEvent {
    fn default() -> Self {
        Self {
            max_jobs: default_max_jobs(),
            include_details: default_include_details(),
            time_budget_secs: None,
        }
    }
}

impl ScrapeEvent {
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_secs.map(Duration::from_secs)
    }
}

/// Metadata block present on every response, success or failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// UTC wall clock, `%Y-%m-%d %H:%M:%S UTC`
    pub scraped_at: String,

    /// Seconds, rounded to two decimals
    pub execution_time_seconds: f64,

    pub source_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_details: Option<bool>,

    /// Set when the run stopped early on cancellation or time budget
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cancelled: bool,
}

impl ResponseMetadata {
    /// Stamp metadata for a run that took `elapsed`.
    pub fn new(source_url: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            scraped_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            execution_time_seconds: (elapsed.as_secs_f64() * 100.0).round() / 100.0,
            source_url: source_url.into(),
            include_details: None,
            cancelled: false,
        }
    }

    pub fn with_include_details(mut self, include_details: bool) -> Self {
        self.include_details = Some(include_details);
        self
    }

    pub fn with_cancelled(mut self, cancelled: bool) -> Self {
        self.cancelled = cancelled;
        self
    }
}

/// The result of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,

    pub jobs_count: usize,
    pub jobs: Vec<CanonicalRecord>,
    pub metadata: ResponseMetadata,
}

impl ScrapeResponse {
    pub fn success(jobs: Vec<CanonicalRecord>, metadata: ResponseMetadata) -> Self {
        Self {
            success: true,
            error: None,
            error_type: None,
            jobs_count: jobs.len(),
            jobs,
            metadata,
        }
    }

    pub fn failure(error: &ScrapeError, metadata: ResponseMetadata) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            error_type: Some(error.kind().to_string()),
            jobs_count: 0,
            jobs: Vec::new(),
            metadata,
        }
    }

    /// Wrap into an HTTP-style result: 200 or 500, JSON headers, pretty body.
    pub fn into_handler_response(self) -> HandlerResponse {
        let status_code = if self.success { 200 } else { 500 };

        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        if self.success {
            headers.insert(
                "Access-Control-Allow-Methods".to_string(),
                "GET, POST, OPTIONS".to_string(),
            );
            headers.insert(
                "Access-Control-Allow-Headers".to_string(),
                "Content-Type".to_string(),
            );
        }

        match serde_json::to_string_pretty(&self) {
            Ok(body) => HandlerResponse {
                status_code,
                headers,
                body,
            },
            Err(e) => {
                let err = ScrapeError::Serialize(e);
                let body = serde_json::json!({
                    "success": false,
                    "error": err.to_string(),
                    "error_type": err.kind(),
                    "jobs": [],
                    "jobs_count": 0,
                })
                .to_string();
                HandlerResponse {
                    status_code: 500,
                    headers,
                    body,
                }
            }
        }
    }
}

/// HTTP-shaped wrapper around a [`ScrapeResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use serde_json::json;

    #[test]
    fn test_event_defaults() {
        let event: ScrapeEvent = serde_json::from_value(json!({})).unwrap();
        assert_eq!(event, ScrapeEvent::default());
        assert_eq!(event.max_jobs, Some(100));
        assert!(event.include_details);

        let unlimited: ScrapeEvent =
            serde_json::from_value(json!({"max_jobs": null, "include_details": false})).unwrap();
        assert_eq!(unlimited.max_jobs, None);
        assert!(!unlimited.include_details);
    }

    #[test]
    fn test_execution_time_rounding() {
        let metadata = ResponseMetadata::new("https://x", Duration::from_millis(1234));
        assert_eq!(metadata.execution_time_seconds, 1.23);
        assert!(metadata.scraped_at.ends_with(" UTC"));
    }

    #[test]
    fn test_success_envelope() {
        let jobs = vec![CanonicalRecord::new()
            .with("title", "Engineer")
            .with("url", "https://x/y")];
        let metadata = ResponseMetadata::new("https://x", Duration::ZERO).with_include_details(true);
        let response = ScrapeResponse::success(jobs, metadata).into_handler_response();

        assert_eq!(response.status_code, 200);
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["jobs_count"], 1);
        assert_eq!(body["jobs"][0]["title"], "Engineer");
        assert_eq!(body["metadata"]["include_details"], true);
        assert!(body.get("error").is_none());
        assert!(body["metadata"].get("cancelled").is_none());
    }

    #[test]
    fn test_failure_envelope() {
        let err = ScrapeError::from(ConfigError::Zero { field: "page_size" });
        let metadata = ResponseMetadata::new("https://x", Duration::ZERO);
        let response = ScrapeResponse::failure(&err, metadata).into_handler_response();

        assert_eq!(response.status_code, 500);
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error_type"], "ConfigError");
        assert_eq!(body["jobs_count"], 0);
        assert_eq!(body["jobs"], json!([]));
        assert!(body["metadata"].get("include_details").is_none());
        assert!(body["metadata"]["scraped_at"].is_string());
    }
}
