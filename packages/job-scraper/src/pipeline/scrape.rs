//! The full scrape: paginate, enrich, clean.

use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::Result;
use crate::pipeline::clean::RecordCleaner;
use crate::pipeline::detail::DetailFetcher;
use crate::pipeline::executor::RequestExecutor;
use crate::pipeline::extract::{extract_basic, extract_detail};
use crate::pipeline::pacing::Pacer;
use crate::pipeline::paginate::ListingPaginator;
use crate::traits::transport::HttpTransport;
use crate::transports::ReqwestTransport;
use crate::types::config::ScraperConfig;
use crate::types::listing::ListingItem;
use crate::types::record::CanonicalRecord;
use crate::types::response::ScrapeEvent;

/// Per-run knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeOptions {
    /// Stop paginating once this many listings are collected
    pub max_records: Option<usize>,
    /// Fetch the detail payload for each listing
    pub include_details: bool,
    /// Cancel the run after this long and keep what was collected
    pub time_budget: Option<Duration>,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            max_records: None,
            include_details: true,
            time_budget: None,
        }
    }
}

impl ScrapeOptions {
    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = Some(max_records);
        self
    }

    pub fn basic_only(mut self) -> Self {
        self.include_details = false;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }
}

impl From<&ScrapeEvent> for ScrapeOptions {
    fn from(event: &ScrapeEvent) -> Self {
        Self {
            max_records: event.max_jobs,
            include_details: event.include_details,
            time_budget: event.time_budget(),
        }
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, Default)]
pub struct ScrapeReport {
    /// Cleaned records in listing order
    pub records: Vec<CanonicalRecord>,
    pub pages_requested: usize,
    pub listings_fetched: usize,
    /// Detail lookups that ran to completion (successful or not)
    pub details_fetched: usize,
    /// Records dropped by the cleaner
    pub rejected: usize,
    /// The run was cut short by cancellation or the time budget
    pub cancelled: bool,
}

/// Result of the enrichment stage.
struct Enrichment {
    records: Vec<CanonicalRecord>,
    details_fetched: usize,
    skipped: usize,
}

/// Runs the scrape pipeline against one transport.
pub struct Scraper<T: HttpTransport> {
    executor: RequestExecutor<T>,
    cleaner: RecordCleaner,
    config: ScraperConfig,
}

impl Scraper<ReqwestTransport> {
    /// Scraper over a real HTTP client built from `config`.
    pub fn from_config(config: ScraperConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Self::new(transport, config)
    }
}

impl<T: HttpTransport> Scraper<T> {
    pub fn new(transport: T, config: ScraperConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            executor: RequestExecutor::new(transport, config.retry.clone()),
            cleaner: RecordCleaner::new(config.min_content_len),
            config,
        })
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        self.executor.transport()
    }

    /// Run the pipeline.
    ///
    /// Cancelling `cancel` (or running out of `time_budget`) stops new
    /// requests; listings already collected are still extracted and
    /// cleaned, and finished detail lookups are kept.
    pub async fn scrape(&self, options: &ScrapeOptions, cancel: CancellationToken) -> ScrapeReport {
        let run = cancel.child_token();
        let timer = options.time_budget.map(|budget| {
            let run = run.clone();
            tokio::spawn(async move {
                tokio::time::sleep(budget).await;
                warn!(budget_secs = budget.as_secs_f64(), "Time budget exhausted, cancelling scrape");
                run.cancel();
            })
        });

        let paginator = ListingPaginator::new(
            &self.executor,
            &self.config.listing_url,
            self.config.page_size,
            self.config.page_delay,
        );
        let pagination = paginator.fetch_all(options.max_records, &run).await;
        let listings_fetched = pagination.items.len();

        let basics: Vec<CanonicalRecord> = pagination
            .items
            .iter()
            .map(|item| extract_basic(item, &self.config.site_url))
            .collect();

        let enrichment = if options.include_details && !basics.is_empty() {
            self.enrich(&pagination.items, basics, &run).await
        } else {
            Enrichment {
                records: basics,
                details_fetched: 0,
                skipped: 0,
            }
        };

        if let Some(timer) = timer {
            timer.abort();
        }

        let records = self.cleaner.clean_all(&enrichment.records);
        let rejected = enrichment.records.len() - records.len();
        let cancelled = pagination.was_cancelled() || enrichment.skipped > 0;

        info!(
            listings = listings_fetched,
            details = enrichment.details_fetched,
            kept = records.len(),
            rejected,
            cancelled,
            "Scrape finished"
        );

        ScrapeReport {
            records,
            pages_requested: pagination.pages_requested,
            listings_fetched,
            details_fetched: enrichment.details_fetched,
            rejected,
            cancelled,
        }
    }

    /// Merge detail fields into each basic record.
    ///
    /// Lookups run on a bounded pool and may finish in any order; each one
    /// writes back to the slot of its listing index. Every lookup waits on
    /// the shared pacer first and reports back to it when done, so the
    /// next one starts no sooner than one interval later.
    async fn enrich(
        &self,
        items: &[ListingItem],
        basics: Vec<CanonicalRecord>,
        cancel: &CancellationToken,
    ) -> Enrichment {
        let fetcher = DetailFetcher::new(&self.executor, &self.config.detail_base_url);
        let pacer = Pacer::new(self.config.detail_delay);
        let (fetcher, pacer) = (&fetcher, &pacer);
        let total = items.len();
        let mut slots = basics;

        let lookups = items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match item.reference_path() {
                Some(path) => Some((index, item.display_title(), path)),
                None => {
                    warn!(index, title = item.display_title(), "No reference path, keeping listing fields");
                    None
                }
            })
            .map(move |(index, title, path)| async move {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => (index, None),
                    payload = async {
                        pacer.wait().await;
                        info!(job = index + 1, total, title, "Processing job");
                        let payload = fetcher.fetch_detail(path).await;
                        pacer.complete();
                        payload
                    } => (index, Some(payload)),
                }
            });

        let mut results = stream::iter(lookups).buffer_unordered(self.config.detail_concurrency);

        let mut details_fetched = 0;
        let mut skipped = 0;
        while let Some((index, payload)) = results.next().await {
            match payload {
                Some(payload) => {
                    details_fetched += 1;
                    slots[index].merge(extract_detail(&payload));
                }
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(skipped, completed = details_fetched, "Detail enrichment cancelled");
        }

        Enrichment {
            records: slots,
            details_fetched,
            skipped,
        }
    }
}
