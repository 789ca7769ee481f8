//! Listing paginator.

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::pipeline::executor::RequestExecutor;
use crate::traits::transport::{HttpRequest, HttpTransport};
use crate::types::listing::{ListingItem, ListingPage, ListingRequest};

/// Why pagination stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page came back empty or could not be fetched
    EmptyPage,
    /// The record cap was reached
    MaxRecords,
    /// As many records as the server reported in total
    ReachedTotal,
    /// Fewer records than the page size
    ShortPage,
    /// Cancelled or out of time
    Cancelled,
}

/// Everything fetched from the listing endpoint, in server order.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub items: Vec<ListingItem>,
    pub pages_requested: usize,
    pub stop_reason: StopReason,
}

impl Pagination {
    pub fn was_cancelled(&self) -> bool {
        self.stop_reason == StopReason::Cancelled
    }
}

/// Walks the listing endpoint page by page.
pub struct ListingPaginator<'a, T: HttpTransport> {
    executor: &'a RequestExecutor<T>,
    listing_url: &'a str,
    page_size: usize,
    page_delay: Duration,
}

impl<'a, T: HttpTransport> ListingPaginator<'a, T> {
    pub fn new(
        executor: &'a RequestExecutor<T>,
        listing_url: &'a str,
        page_size: usize,
        page_delay: Duration,
    ) -> Self {
        Self {
            executor,
            listing_url,
            page_size: page_size.max(1),
            page_delay,
        }
    }

    /// Fetch one page. Failures and undecodable bodies yield an empty page.
    pub async fn fetch_page(&self, offset: usize, limit: usize) -> ListingPage {
        info!(limit, offset, "Fetching job listings");

        let body = match serde_json::to_value(ListingRequest::page(offset, limit)) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Failed to encode listing request");
                return ListingPage::empty();
            }
        };
        let request = HttpRequest::post_json(self.listing_url, body);

        let Some(response) = self.executor.execute(&request).await.into_response() else {
            error!(offset, "Failed to fetch job listings");
            return ListingPage::empty();
        };

        match response.json::<ListingPage>() {
            Ok(page) => {
                info!(count = page.job_postings.len(), offset, "Retrieved jobs from API");
                page
            }
            Err(e) => {
                error!(offset, error = %e, "Failed to decode listing response");
                ListingPage::empty()
            }
        }
    }

    /// Fetch pages until a stop condition holds.
    ///
    /// Stop conditions, checked in order after each page: empty page,
    /// `max_records` reached (result truncated to exactly that many),
    /// server total reached, short page. Cancelling `cancel` stops before the
    /// next request and keeps what was collected.
    pub async fn fetch_all(
        &self,
        max_records: Option<usize>,
        cancel: &CancellationToken,
    ) -> Pagination {
        info!(page_size = self.page_size, max_records = ?max_records, "Fetching all job listings");

        let mut items: Vec<ListingItem> = Vec::new();
        let mut pages_requested = 0;
        let mut offset = 0;
        // Some tenants only report the total on the first page
        let mut reported_total: Option<usize> = None;

        if max_records == Some(0) {
            return Pagination {
                items,
                pages_requested,
                stop_reason: StopReason::MaxRecords,
            };
        }

        let stop_reason = loop {
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }

            let page = tokio::select! {
                page = self.fetch_page(offset, self.page_size) => page,
                _ = cancel.cancelled() => break StopReason::Cancelled,
            };
            pages_requested += 1;

            if page.is_empty() {
                break StopReason::EmptyPage;
            }

            let page_len = page.job_postings.len();
            items.extend(page.job_postings);
            if let Some(total) = page.total.filter(|t| *t > 0) {
                reported_total = Some(reported_total.map_or(total, |seen| seen.max(total)));
            }
            debug!(
                collected = items.len(),
                total = ?reported_total,
                "Retrieved listings so far"
            );

            if let Some(max) = max_records {
                if items.len() >= max {
                    items.truncate(max);
                    break StopReason::MaxRecords;
                }
            }
            if reported_total.is_some_and(|total| items.len() >= total) {
                break StopReason::ReachedTotal;
            }
            if page_len < self.page_size {
                break StopReason::ShortPage;
            }

            offset += self.page_size;

            if !self.page_delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.page_delay) => {}
                    _ = cancel.cancelled() => break StopReason::Cancelled,
                }
            }
        };

        if stop_reason == StopReason::Cancelled {
            warn!(collected = items.len(), pages_requested, "Listing pagination cancelled");
        }
        info!(
            total_retrieved = items.len(),
            pages_requested,
            stop_reason = ?stop_reason,
            "Listing pagination finished"
        );

        Pagination {
            items,
            pages_requested,
            stop_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeWorkday;
    use crate::traits::transport::Method;
    use crate::transports::{MockReply, MockTransport};
    use crate::types::config::RetryPolicy;
    use serde_json::json;

    const LISTING_URL: &str = "https://tenant.example.com/wday/cxs/t/Jobs/jobs";

    fn executor<T: HttpTransport>(transport: T) -> RequestExecutor<T> {
        RequestExecutor::new(transport, RetryPolicy::new(3, Duration::ZERO))
    }

    #[tokio::test]
    async fn test_page_count_matches_ceil() {
        let backend = FakeWorkday::with_postings(45);
        let executor = executor(backend.clone());
        let paginator = ListingPaginator::new(&executor, LISTING_URL, 20, Duration::ZERO);

        let result = paginator.fetch_all(None, &CancellationToken::new()).await;

        assert_eq!(result.items.len(), 45);
        assert_eq!(result.pages_requested, 3);
        assert_eq!(backend.listing_offsets(), vec![0, 20, 40]);
        assert_eq!(result.stop_reason, StopReason::ReachedTotal);
    }

    #[tokio::test]
    async fn test_max_records_truncates_without_extra_pages() {
        let backend = FakeWorkday::with_postings(100);
        let executor = executor(backend.clone());
        let paginator = ListingPaginator::new(&executor, LISTING_URL, 20, Duration::ZERO);

        let result = paginator.fetch_all(Some(25), &CancellationToken::new()).await;

        assert_eq!(result.items.len(), 25);
        assert_eq!(result.pages_requested, 2);
        assert_eq!(result.stop_reason, StopReason::MaxRecords);
        assert_eq!(result.items[24].title.as_deref(), Some("Job 24"));
    }

    #[tokio::test]
    async fn test_zero_cap_makes_no_requests() {
        let backend = FakeWorkday::with_postings(10);
        let executor = executor(backend.clone());
        let paginator = ListingPaginator::new(&executor, LISTING_URL, 20, Duration::ZERO);

        let result = paginator.fetch_all(Some(0), &CancellationToken::new()).await;

        assert!(result.items.is_empty());
        assert_eq!(result.pages_requested, 0);
        assert!(backend.listing_offsets().is_empty());
    }

    #[tokio::test]
    async fn test_short_page_stops_when_total_missing() {
        let mock = MockTransport::new().with_replies(
            Method::Post,
            LISTING_URL,
            vec![MockReply::json(json!({
                "jobPostings": [{"title": "Only"}]
            }))],
        );
        let executor = executor(mock.clone());
        let paginator = ListingPaginator::new(&executor, LISTING_URL, 20, Duration::ZERO);

        let result = paginator.fetch_all(None, &CancellationToken::new()).await;

        assert_eq!(result.items.len(), 1);
        assert_eq!(result.stop_reason, StopReason::ShortPage);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_total_from_first_page_is_remembered() {
        let page = |n: usize, total: usize| {
            let postings: Vec<_> = (0..n).map(|i| json!({"title": format!("J{i}")})).collect();
            MockReply::json(json!({"total": total, "jobPostings": postings}))
        };
        let mock = MockTransport::new().with_replies(
            Method::Post,
            LISTING_URL,
            vec![page(2, 4), page(2, 0), page(2, 0)],
        );
        let executor = executor(mock.clone());
        let paginator = ListingPaginator::new(&executor, LISTING_URL, 2, Duration::ZERO);

        let result = paginator.fetch_all(None, &CancellationToken::new()).await;

        assert_eq!(result.items.len(), 4);
        assert_eq!(result.stop_reason, StopReason::ReachedTotal);
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_page_ends_pagination() {
        let mock =
            MockTransport::new().with_replies(Method::Post, LISTING_URL, vec![MockReply::status(500)]);
        let executor = executor(mock.clone());
        let paginator = ListingPaginator::new(&executor, LISTING_URL, 20, Duration::ZERO);

        let result = paginator.fetch_all(None, &CancellationToken::new()).await;

        assert!(result.items.is_empty());
        assert_eq!(result.stop_reason, StopReason::EmptyPage);
        // One page, three attempts
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_undecodable_page_is_empty() {
        let mock = MockTransport::new().with_replies(
            Method::Post,
            LISTING_URL,
            vec![MockReply::Status(200, "<html>maintenance</html>".into())],
        );
        let executor = executor(mock);
        let paginator = ListingPaginator::new(&executor, LISTING_URL, 20, Duration::ZERO);

        let page = paginator.fetch_page(0, 20).await;
        assert_eq!(page, ListingPage::empty());
    }

    #[tokio::test]
    async fn test_request_body_shape() {
        let backend = FakeWorkday::with_postings(3);
        let executor = executor(backend.clone());
        let paginator = ListingPaginator::new(&executor, LISTING_URL, 20, Duration::ZERO);

        paginator.fetch_page(40, 20).await;

        let body = backend.listing_bodies().pop().unwrap();
        assert_eq!(
            body,
            json!({"appliedFacets": {}, "limit": 20, "offset": 40, "searchText": ""})
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_start_keeps_nothing() {
        let backend = FakeWorkday::with_postings(10);
        let executor = executor(backend.clone());
        let paginator = ListingPaginator::new(&executor, LISTING_URL, 5, Duration::ZERO);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = paginator.fetch_all(None, &cancel).await;

        assert!(result.was_cancelled());
        assert_eq!(result.pages_requested, 0);
        assert!(backend.listing_offsets().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_during_page_delay_keeps_collected_items() {
        let backend = FakeWorkday::with_postings(50);
        let executor = executor(backend.clone());
        let paginator = ListingPaginator::new(&executor, LISTING_URL, 10, Duration::from_secs(30));
        let cancel = CancellationToken::new();

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                cancel.cancel();
            })
        };
        let result = paginator.fetch_all(None, &cancel).await;
        canceller.await.unwrap();

        assert!(result.was_cancelled());
        assert_eq!(result.items.len(), 10);
        assert_eq!(result.pages_requested, 1);
    }
}
