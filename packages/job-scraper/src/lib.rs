//! Job Posting Scraper
//!
//! Walks a paginated job-board listing API, optionally looks up each
//! posting's detail payload, and normalizes everything into flat
//! [`CanonicalRecord`]s.
//!
//! # Pipeline
//!
//! 1. **Paginate** the listing endpoint until a stop condition holds
//! 2. **Extract** basic fields from each listing entry
//! 3. **Enrich** with detail fields and description mining (optional)
//! 4. **Clean** records, rejecting those without a title or URL
//!
//! Every request goes through the [`RequestExecutor`], which retries
//! transient failures with backoff and reports the outcome as a value.
//!
//! # Usage
//!
//! ```rust,ignore
//! use job_scraper::{ScrapeOptions, Scraper, ScraperConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let scraper = Scraper::from_config(ScraperConfig::from_env()?)?;
//! let options = ScrapeOptions::default().with_max_records(50);
//! let report = scraper.scrape(&options, CancellationToken::new()).await;
//! println!("{} jobs", report.records.len());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - The transport abstraction
//! - [`transports`] - `reqwest` and mock transports
//! - [`types`] - Config, payloads, records and the response envelope
//! - [`pipeline`] - Executor, paginator, detail fetcher, extraction, cleaning
//! - [`handler`] - Event-to-envelope entry points
//! - [`testing`] - In-memory job board for tests

pub mod error;
pub mod handler;
pub mod pipeline;
pub mod testing;
pub mod traits;
pub mod transports;
pub mod types;

pub use error::{ConfigError, Result, ScrapeError, TransportError};
pub use traits::transport::{HttpRequest, HttpResponse, HttpTransport, Method};

pub use types::{
    config::{RetryPolicy, ScraperConfig},
    detail::DetailPayload,
    listing::{ListingItem, ListingPage},
    record::CanonicalRecord,
    response::{HandlerResponse, ResponseMetadata, ScrapeEvent, ScrapeResponse},
};

pub use pipeline::{
    DetailFetcher, FailureKind, FetchOutcome, ListingPaginator, Pacer, Pagination, RecordCleaner,
    RequestExecutor, ScrapeOptions, ScrapeReport, Scraper, StopReason,
};

pub use transports::{MockReply, MockTransport, ReqwestTransport};
pub use testing::FakeWorkday;
