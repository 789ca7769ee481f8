//! Detail fetcher.

use tracing::{error, info};

use crate::pipeline::executor::RequestExecutor;
use crate::traits::transport::{HttpRequest, HttpTransport};
use crate::types::detail::DetailPayload;

/// Resolves reference paths against the detail endpoint.
pub struct DetailFetcher<'a, T: HttpTransport> {
    executor: &'a RequestExecutor<T>,
    detail_base_url: &'a str,
}

impl<'a, T: HttpTransport> DetailFetcher<'a, T> {
    pub fn new(executor: &'a RequestExecutor<T>, detail_base_url: &'a str) -> Self {
        Self {
            executor,
            detail_base_url,
        }
    }

    /// `<detail base>/<path without leading slashes>`.
    pub fn detail_url(&self, reference_path: &str) -> String {
        let base = self.detail_base_url.trim_end_matches('/');
        let path = reference_path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Fetch one detail payload.
    ///
    /// Never fails: an unreachable resource or an undecodable body yields
    /// an empty payload and the caller keeps the listing fields.
    pub async fn fetch_detail(&self, reference_path: &str) -> DetailPayload {
        let url = self.detail_url(reference_path);
        info!(url = %url, "Fetching job details");

        let Some(response) = self
            .executor
            .execute(&HttpRequest::get(url.as_str()))
            .await
            .into_response()
        else {
            error!(url = %url, "Failed to fetch job details");
            return DetailPayload::default();
        };

        match response.json::<DetailPayload>() {
            Ok(payload) => payload,
            Err(e) => {
                error!(url = %url, error = %e, "Failed to decode job details JSON");
                DetailPayload::default()
            }
        }
    }
}
