//! Testing utilities: an in-memory job board.
//!
//! [`FakeWorkday`] answers listing POSTs by `offset`/`limit` and detail GETs
//! by reference path, without touching the network. Useful for exercising
//! the whole pipeline, including ordering and cancellation.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::TransportResult;
use crate::traits::transport::{HttpRequest, HttpResponse, HttpTransport, Method};
use crate::types::config::ScraperConfig;

/// A listing entry as the board serves it.
pub fn posting(index: usize) -> Value {
    json!({
        "title": format!("Job {index}"),
        "locationsText": "McLean, VA",
        "postedOn": "Posted Today",
        "bulletFields": [format!("R{index}")],
        "externalPath": format!("/job/McLean-VA/Job-{index}_R{index}"),
    })
}

/// The detail payload behind [`posting`].
pub fn detail(index: usize) -> Value {
    json!({
        "jobPostingInfo": {
            "id": format!("id-{index}"),
            "title": format!("Job {index}"),
            "jobDescription": format!(
                "<p>Job {index} supports mission systems. Requires Secret clearance and {} years of experience. Salary $90,000 to $120,000.</p>",
                index % 10 + 1
            ),
            "location": "McLean, Virginia",
            "postedOn": "Posted Today",
            "jobReqId": format!("R{index}"),
            "timeType": "Full time",
            "externalUrl": format!("{}/job/McLean-VA/Job-{index}_R{index}", FakeWorkday::SITE_URL),
            "canApply": true,
            "jobRequisitionLocation": {
                "descriptor": "McLean, Virginia",
                "country": {"descriptor": "United States of America", "alpha2Code": "US"}
            }
        },
        "hiringOrganization": {"name": "Example Corp", "url": ""}
    })
}

#[derive(Default)]
struct BoardState {
    postings: Vec<Value>,
    details: HashMap<String, Value>,
    /// Overrides the reported total; `Some(None)` omits the field
    total: Option<Option<usize>>,
    failing_details: HashSet<String>,
    detail_latency: HashMap<String, Duration>,
    listing_latency: Duration,
}

#[derive(Default)]
struct CallLog {
    listing_bodies: Vec<Value>,
    detail_urls: Vec<String>,
}

/// In-memory listing/detail backend.
///
/// Clones share state, so a test can hand one clone to the scraper and
/// inspect the calls through another.
#[derive(Clone, Default)]
pub struct FakeWorkday {
    state: Arc<RwLock<BoardState>>,
    calls: Arc<RwLock<CallLog>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl FakeWorkday {
    pub const LISTING_URL: &'static str = "https://tenant.example.com/wday/cxs/t/Jobs/jobs";
    pub const DETAIL_BASE_URL: &'static str = "https://tenant.example.com/wday/cxs/t/Jobs";
    pub const SITE_URL: &'static str = "https://tenant.example.com/en-US/Jobs";

    /// A board with `count` postings titled `Job 0`, `Job 1`, ...
    pub fn with_postings(count: usize) -> Self {
        let board = Self::default();
        {
            let mut state = board.state.write().unwrap();
            for index in 0..count {
                state.postings.push(posting(index));
                state.details.insert(detail_key(index), detail(index));
            }
        }
        board
    }

    /// Scraper config pointed at this board, with every delay removed.
    pub fn config() -> ScraperConfig {
        ScraperConfig::new()
            .with_endpoints(Self::LISTING_URL, Self::DETAIL_BASE_URL, Self::SITE_URL)
            .without_pacing()
    }

    /// Report this total instead of the posting count; `None` omits it.
    pub fn with_total(self, total: Option<usize>) -> Self {
        self.state.write().unwrap().total = Some(total);
        self
    }

    /// Answer the detail lookup for posting `index` with a 404.
    pub fn with_failing_detail(self, index: usize) -> Self {
        self.state
            .write()
            .unwrap()
            .failing_details
            .insert(detail_key(index));
        self
    }

    /// Drop the reference path from posting `index`.
    pub fn without_path(self, index: usize) -> Self {
        if let Some(Value::Object(posting)) = self.state.write().unwrap().postings.get_mut(index) {
            posting.remove("externalPath");
        }
        self
    }

    /// Delay the detail answer for posting `index`.
    pub fn with_detail_latency(self, index: usize, latency: Duration) -> Self {
        self.state
            .write()
            .unwrap()
            .detail_latency
            .insert(detail_key(index), latency);
        self
    }

    /// Delay every listing answer.
    pub fn with_listing_latency(self, latency: Duration) -> Self {
        self.state.write().unwrap().listing_latency = latency;
        self
    }

    /// Bodies of every listing request, in order.
    pub fn listing_bodies(&self) -> Vec<Value> {
        self.calls.read().unwrap().listing_bodies.clone()
    }

    /// Offsets of every listing request, in order.
    pub fn listing_offsets(&self) -> Vec<usize> {
        self.listing_bodies()
            .iter()
            .filter_map(|body| body.get("offset").and_then(Value::as_u64))
            .map(|offset| offset as usize)
            .collect()
    }

    /// URLs of every detail request, in the order they arrived.
    pub fn detail_calls(&self) -> Vec<String> {
        self.calls.read().unwrap().detail_urls.clone()
    }

    /// Most detail requests ever in flight at once.
    pub fn max_concurrent_details(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn listing_page(&self, request: &HttpRequest) -> (HttpResponse, Duration) {
        let body = request.body.clone().unwrap_or(Value::Null);
        let offset = body.get("offset").and_then(Value::as_u64).unwrap_or(0) as usize;
        let limit = body.get("limit").and_then(Value::as_u64).unwrap_or(20) as usize;
        self.calls.write().unwrap().listing_bodies.push(body);

        let state = self.state.read().unwrap();
        let page: Vec<Value> = state.postings.iter().skip(offset).take(limit).cloned().collect();
        let total = state.total.unwrap_or(Some(state.postings.len()));

        let mut response = json!({ "jobPostings": page });
        if let Some(total) = total {
            response["total"] = json!(total);
        }
        (HttpResponse::new(200, response.to_string()), state.listing_latency)
    }

    fn detail_page(&self, request: &HttpRequest) -> (HttpResponse, Duration) {
        self.calls
            .write()
            .unwrap()
            .detail_urls
            .push(request.url.clone());

        let key = request
            .url
            .strip_prefix(Self::DETAIL_BASE_URL)
            .map(|path| path.trim_start_matches('/'));

        let state = self.state.read().unwrap();
        let Some(key) = key else {
            return (HttpResponse::new(404, ""), Duration::ZERO);
        };
        let latency = state.detail_latency.get(key).copied().unwrap_or_default();
        if state.failing_details.contains(key) {
            return (HttpResponse::new(404, ""), latency);
        }
        match state.details.get(key) {
            Some(payload) => (HttpResponse::new(200, payload.to_string()), latency),
            None => (HttpResponse::new(404, ""), latency),
        }
    }
}

fn detail_key(index: usize) -> String {
    format!("job/McLean-VA/Job-{index}_R{index}")
}

#[async_trait]
impl HttpTransport for FakeWorkday {
    async fn send(&self, request: &HttpRequest) -> TransportResult<HttpResponse> {
        match request.method {
            Method::Post => {
                let (response, latency) = self.listing_page(request);
                if !latency.is_zero() {
                    tokio::time::sleep(latency).await;
                }
                Ok(response)
            }
            Method::Get => {
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_in_flight.fetch_max(now, Ordering::SeqCst);

                let (response, latency) = self.detail_page(request);
                if !latency.is_zero() {
                    tokio::time::sleep(latency).await;
                } else {
                    tokio::task::yield_now().await;
                }

                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(response)
            }
        }
    }

    fn name(&self) -> &str {
        "fake-workday"
    }
}
