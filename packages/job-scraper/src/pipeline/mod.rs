//! The scrape pipeline.
//!
//! - Request execution with retry and backoff
//! - Listing pagination and detail lookups
//! - Field extraction, description mining and cleaning
//! - Orchestration with pacing, bounded concurrency and cancellation

pub mod clean;
pub mod detail;
pub mod executor;
pub mod extract;
pub mod mine;
pub mod pacing;
pub mod paginate;
pub mod scrape;

pub use clean::{RecordCleaner, SweepPolicy};
pub use detail::DetailFetcher;
pub use executor::{FailureKind, FetchOutcome, RequestExecutor};
pub use extract::{extract_basic, extract_detail, merge_records};
pub use mine::{mine_clearance, mine_description, mine_experience_years, mine_salary};
pub use pacing::Pacer;
pub use paginate::{ListingPaginator, Pagination, StopReason};
pub use scrape::{ScrapeOptions, ScrapeReport, Scraper};
