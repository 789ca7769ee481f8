//! Integration tests for the full scrape pipeline.
//!
//! These run the scraper against the in-memory job board and check:
//! 1. Record shape after extraction, mining and cleaning
//! 2. Listing order under concurrent detail lookups
//! 3. Pacing between lookups and across workers
//! 4. Partial results on cancellation and time budget
//! 5. Repeat runs producing identical output

use std::time::{Duration, Instant};

use job_scraper::handler;
use job_scraper::{FakeWorkday, ScrapeEvent, ScrapeOptions, Scraper, ScraperConfig};
use tokio_util::sync::CancellationToken;

/// Helper to build a scraper over a board.
fn scraper_with(backend: &FakeWorkday, config: ScraperConfig) -> Scraper<FakeWorkday> {
    Scraper::new(backend.clone(), config).unwrap()
}

#[tokio::test]
async fn test_full_pipeline_record_shape() {
    let backend = FakeWorkday::with_postings(3);
    let scraper = scraper_with(&backend, FakeWorkday::config());

    let report = scraper
        .scrape(&ScrapeOptions::default(), CancellationToken::new())
        .await;

    assert_eq!(report.records.len(), 3);
    assert_eq!(report.pages_requested, 1);

    let record = &report.records[2];
    let keys: Vec<_> = record.keys().collect();
    assert_eq!(&keys[..2], &["title", "url"]);
    assert_eq!(record.get("job_id"), Some("R2"));
    assert_eq!(record.get("job_type"), Some("Full time"));
    assert_eq!(record.get("salary_range"), Some("$90,000 to $120,000"));
    assert_eq!(record.get("security_clearance"), Some("Secret clearance"));
    assert_eq!(record.get("country"), Some("United States of America"));
    // Short values outside the fixed lists are not swept in
    assert!(!record.contains("experience_years"));
    assert!(!record.contains("can_apply"));
    assert!(!record.contains("country_code"));
}

#[tokio::test]
async fn test_output_follows_listing_order_with_concurrent_lookups() {
    let backend = FakeWorkday::with_postings(6)
        .with_detail_latency(0, Duration::from_millis(90))
        .with_detail_latency(1, Duration::from_millis(60))
        .with_detail_latency(2, Duration::from_millis(30));
    let scraper = scraper_with(&backend, FakeWorkday::config().with_detail_concurrency(3));

    let report = scraper
        .scrape(&ScrapeOptions::default(), CancellationToken::new())
        .await;

    let titles: Vec<_> = report.records.iter().filter_map(|r| r.title()).collect();
    assert_eq!(titles, vec!["Job 0", "Job 1", "Job 2", "Job 3", "Job 4", "Job 5"]);
    assert!(report.records.iter().all(|r| r.contains("description")));

    let in_flight = backend.max_concurrent_details();
    assert!(in_flight > 1, "expected overlapping lookups, saw {in_flight}");
    assert!(in_flight <= 3, "pool bound exceeded: {in_flight}");
}

#[tokio::test]
async fn test_pacing_is_global_across_workers() {
    let backend = FakeWorkday::with_postings(4);
    let config = FakeWorkday::config()
        .with_detail_concurrency(4)
        .with_detail_delay(Duration::from_millis(100));
    let scraper = scraper_with(&backend, config);

    let started = Instant::now();
    let report = scraper
        .scrape(&ScrapeOptions::default(), CancellationToken::new())
        .await;

    assert_eq!(report.details_fetched, 4);
    // Four permits, one per interval, the first one immediate
    assert!(started.elapsed() >= Duration::from_millis(250));
}

#[tokio::test]
async fn test_detail_delay_follows_each_completed_lookup() {
    let latency = Duration::from_millis(150);
    let backend = FakeWorkday::with_postings(3)
        .with_detail_latency(0, latency)
        .with_detail_latency(1, latency)
        .with_detail_latency(2, latency);
    let config = FakeWorkday::config().with_detail_delay(Duration::from_millis(150));
    let scraper = scraper_with(&backend, config);

    let started = Instant::now();
    let report = scraper
        .scrape(&ScrapeOptions::default(), CancellationToken::new())
        .await;

    assert_eq!(report.details_fetched, 3);
    // Three lookups plus a pause after each of the first two
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(700), "finished in {elapsed:?}");
}

#[tokio::test]
async fn test_time_budget_keeps_partial_results() {
    let backend = FakeWorkday::with_postings(6).with_detail_latency(3, Duration::from_secs(10));
    let scraper = scraper_with(&backend, FakeWorkday::config());
    let options = ScrapeOptions::default().with_time_budget(Duration::from_millis(300));

    let started = Instant::now();
    let report = scraper.scrape(&options, CancellationToken::new()).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(report.cancelled);
    // Every listing survives; only finished lookups are merged in
    assert_eq!(report.records.len(), 6);
    assert_eq!(report.details_fetched, 3);
    assert!(report.records[2].contains("description"));
    assert!(!report.records[3].contains("description"));
    assert!(!report.records[5].contains("description"));
}

#[tokio::test]
async fn test_cancel_during_pagination_returns_basic_records() {
    let backend = FakeWorkday::with_postings(20).with_listing_latency(Duration::from_millis(200));
    let scraper = scraper_with(&backend, FakeWorkday::config().with_page_size(5));
    let cancel = CancellationToken::new();

    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            cancel.cancel();
        })
    };
    let report = scraper.scrape(&ScrapeOptions::default(), cancel).await;
    canceller.await.unwrap();

    assert!(report.cancelled);
    assert_eq!(report.listings_fetched, 5);
    assert_eq!(report.records.len(), 5);
    assert_eq!(report.details_fetched, 0);
    assert!(backend.detail_calls().is_empty());
}

#[tokio::test]
async fn test_repeat_runs_are_identical() {
    let backend = FakeWorkday::with_postings(25);
    let scraper = scraper_with(&backend, FakeWorkday::config().with_detail_concurrency(4));

    let first = scraper
        .scrape(&ScrapeOptions::default(), CancellationToken::new())
        .await;
    let second = scraper
        .scrape(&ScrapeOptions::default(), CancellationToken::new())
        .await;

    assert_eq!(
        serde_json::to_string(&first.records).unwrap(),
        serde_json::to_string(&second.records).unwrap()
    );
}

#[tokio::test]
async fn test_event_cap_through_handler() {
    let backend = FakeWorkday::with_postings(150);
    let scraper = scraper_with(&backend, FakeWorkday::config());

    let response = handler::handle(&scraper, &ScrapeEvent::default(), CancellationToken::new()).await;

    assert!(response.success);
    assert_eq!(response.jobs_count, 100);
    assert_eq!(backend.listing_offsets(), vec![0, 20, 40, 60, 80]);

    let wrapped = response.into_handler_response();
    assert_eq!(wrapped.status_code, 200);
    let body: serde_json::Value = serde_json::from_str(&wrapped.body).unwrap();
    assert_eq!(body["jobs_count"], 100);
    assert_eq!(body["metadata"]["include_details"], true);
    assert!(body["metadata"].get("cancelled").is_none());
}

#[tokio::test]
async fn test_unlimited_event_collects_everything() {
    let backend = FakeWorkday::with_postings(45);
    let scraper = scraper_with(&backend, FakeWorkday::config());
    let event: ScrapeEvent =
        serde_json::from_value(serde_json::json!({"max_jobs": null, "include_details": false}))
            .unwrap();

    let response = handler::handle(&scraper, &event, CancellationToken::new()).await;

    assert_eq!(response.jobs_count, 45);
    assert!(backend.detail_calls().is_empty());
}
