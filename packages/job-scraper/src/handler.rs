//! Invocation entry points: event in, response envelope out.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::ScrapeError;
use crate::pipeline::scrape::{ScrapeOptions, Scraper};
use crate::traits::transport::HttpTransport;
use crate::types::config::ScraperConfig;
use crate::types::response::{ResponseMetadata, ScrapeEvent, ScrapeResponse};

/// Build a real scraper from `config` and run one event.
///
/// A scraper that cannot be built (bad config, client setup failure)
/// becomes a failure envelope rather than an error.
pub async fn run(config: ScraperConfig, event: &ScrapeEvent) -> ScrapeResponse {
    let started = Instant::now();
    let source_url = config.listing_url.clone();

    match Scraper::from_config(config) {
        Ok(scraper) => handle(&scraper, event, CancellationToken::new()).await,
        Err(e) => {
            error!(error = %e, error_type = e.kind(), "Scraper setup failed");
            ScrapeResponse::failure(&e, ResponseMetadata::new(source_url, started.elapsed()))
        }
    }
}

/// Run one event against an existing scraper.
///
/// A panic inside the pipeline is caught and reported as an
/// `InternalError` failure envelope.
pub async fn handle<T: HttpTransport>(
    scraper: &Scraper<T>,
    event: &ScrapeEvent,
    cancel: CancellationToken,
) -> ScrapeResponse {
    let started = Instant::now();
    info!(
        max_jobs = ?event.max_jobs,
        include_details = event.include_details,
        time_budget_secs = ?event.time_budget_secs,
        transport = scraper.transport().name(),
        "Starting job scrape"
    );

    let options = ScrapeOptions::from(event);
    let scrape = scraper.scrape(&options, cancel);
    let report = match AssertUnwindSafe(scrape).catch_unwind().await {
        Ok(report) => report,
        Err(panic_info) => {
            let err = ScrapeError::Internal(extract_panic_message(&panic_info));
            error!(error = %err, error_type = err.kind(), "Scrape panicked");
            let metadata =
                ResponseMetadata::new(&scraper.config().listing_url, started.elapsed());
            return ScrapeResponse::failure(&err, metadata);
        }
    };

    let metadata = ResponseMetadata::new(&scraper.config().listing_url, started.elapsed())
        .with_include_details(event.include_details)
        .with_cancelled(report.cancelled);

    info!(
        jobs = report.records.len(),
        seconds = metadata.execution_time_seconds,
        "Successfully scraped jobs"
    );
    ScrapeResponse::success(report.records, metadata)
}

fn extract_panic_message(panic_info: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
