//! Configuration types for the scraper.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigError, ScrapeError};

pub const DEFAULT_LISTING_URL: &str =
    "https://bah.wd1.myworkdayjobs.com/wday/cxs/bah/BAH_Jobs/jobs";
pub const DEFAULT_DETAIL_BASE_URL: &str =
    "https://bah.wd1.myworkdayjobs.com/wday/cxs/bah/BAH_Jobs";
pub const DEFAULT_SITE_URL: &str = "https://bah.wd1.myworkdayjobs.com/en-US/BAH_Jobs";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Retry schedule for the request executor.
///
/// Generic failures wait `base_delay * 2^attempt`, rate-limited responses
/// wait `base_delay * 3^attempt`. `attempt` counts from zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Delay unit the backoff multipliers scale
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay after a transient failure on `attempt`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Delay after a 429 on `attempt`.
    pub fn rate_limit_delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(3u32.saturating_pow(attempt))
    }
}

/// Scraper configuration.
///
/// Built once and handed to [`Scraper::new`](crate::pipeline::scrape::Scraper::new),
/// which validates it. Nothing in the pipeline mutates it afterwards.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Paginated listing endpoint (POST)
    pub listing_url: String,

    /// Base the reference paths are resolved against (GET)
    pub detail_base_url: String,

    /// Public site prefix used to build each record's `url`
    pub site_url: String,

    /// Sent as `User-Agent` on every request
    pub user_agent: String,

    /// Per-request timeout. Default: 30s.
    pub request_timeout: Duration,

    /// Retry schedule for every request.
    pub retry: RetryPolicy,

    /// Records requested per listing page. Default: 20.
    pub page_size: usize,

    /// Pause between listing pages. Default: 500ms.
    pub page_delay: Duration,

    /// Minimum spacing between detail requests, shared by all workers.
    /// Default: 500ms.
    pub detail_delay: Duration,

    /// Detail lookups allowed in flight at once. Default: 1 (sequential).
    pub detail_concurrency: usize,

    /// Free-text fields must be longer than this to survive cleaning.
    pub min_content_len: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            detail_base_url: DEFAULT_DETAIL_BASE_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            page_size: 20,
            page_delay: Duration::from_millis(500),
            detail_delay: Duration::from_millis(500),
            detail_concurrency: 1,
            min_content_len: 10,
        }
    }
}

impl ScraperConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from `JOB_SCRAPER_*` environment variables.
    ///
    /// A `.env` file is read first if present. Unset variables keep their
    /// defaults; set-but-unparseable ones are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        Ok(Self {
            listing_url: env_string("JOB_SCRAPER_LISTING_URL").unwrap_or(defaults.listing_url),
            detail_base_url: env_string("JOB_SCRAPER_DETAIL_BASE_URL")
                .unwrap_or(defaults.detail_base_url),
            site_url: env_string("JOB_SCRAPER_SITE_URL").unwrap_or(defaults.site_url),
            user_agent: env_string("JOB_SCRAPER_USER_AGENT").unwrap_or(defaults.user_agent),
            request_timeout: env_parse::<u64>("JOB_SCRAPER_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            retry: RetryPolicy {
                max_attempts: env_parse("JOB_SCRAPER_MAX_ATTEMPTS")?
                    .unwrap_or(defaults.retry.max_attempts),
                base_delay: env_parse::<u64>("JOB_SCRAPER_RETRY_DELAY_MS")?
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.retry.base_delay),
            },
            page_size: env_parse("JOB_SCRAPER_PAGE_SIZE")?.unwrap_or(defaults.page_size),
            page_delay: env_parse::<u64>("JOB_SCRAPER_PAGE_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.page_delay),
            detail_delay: env_parse::<u64>("JOB_SCRAPER_DETAIL_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.detail_delay),
            detail_concurrency: env_parse("JOB_SCRAPER_DETAIL_CONCURRENCY")?
                .unwrap_or(defaults.detail_concurrency),
            min_content_len: env_parse("JOB_SCRAPER_MIN_CONTENT_LEN")?
                .unwrap_or(defaults.min_content_len),
        })
    }

    /// Point the scraper at a different tenant.
    pub fn with_endpoints(
        mut self,
        listing_url: impl Into<String>,
        detail_base_url: impl Into<String>,
        site_url: impl Into<String>,
    ) -> Self {
        self.listing_url = listing_url.into();
        self.detail_base_url = detail_base_url.into();
        self.site_url = site_url.into();
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the listing page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the pause between listing pages.
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Set the spacing between detail requests.
    pub fn with_detail_delay(mut self, delay: Duration) -> Self {
        self.detail_delay = delay;
        self
    }

    /// Set how many detail lookups may run at once.
    pub fn with_detail_concurrency(mut self, concurrency: usize) -> Self {
        self.detail_concurrency = concurrency;
        self
    }

    /// Drop every delay. Meant for tests against in-memory backends.
    pub fn without_pacing(mut self) -> Self {
        self.page_delay = Duration::ZERO;
        self.detail_delay = Duration::ZERO;
        self.retry.base_delay = Duration::ZERO;
        self
    }

    /// Check the settings that would otherwise hang or spin the pipeline.
    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.page_size == 0 {
            return Err(ConfigError::Zero { field: "page_size" }.into());
        }
        if self.detail_concurrency == 0 {
            return Err(ConfigError::Zero {
                field: "detail_concurrency",
            }
            .into());
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Zero {
                field: "max_attempts",
            }
            .into());
        }
        for url in [&self.listing_url, &self.detail_base_url, &self.site_url] {
            url::Url::parse(url).map_err(|source| ScrapeError::InvalidUrl {
                url: url.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

fn env_string(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(var: &str) -> Result<Option<T>, ConfigError> {
    match env_string(var) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                var: var.to_string(),
                value,
            }),
        None => Ok(None),
    }
}
