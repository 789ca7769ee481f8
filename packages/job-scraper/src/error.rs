//! Typed errors for the job scraper.
//!
//! Per-request failures are not errors here: the request executor reports
//! them as a [`FailureKind`](crate::pipeline::executor::FailureKind) inside a
//! [`FetchOutcome`](crate::pipeline::executor::FetchOutcome). The types below
//! cover what can break the pipeline as a whole.

use thiserror::Error;

/// Errors that abort a scrape run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Configuration rejected at construction time
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An endpoint URL could not be parsed
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The concrete HTTP client could not be built
    #[error("transport setup failed: {0}")]
    TransportSetup(String),

    /// The response envelope could not be serialized
    #[error("JSON serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The pipeline panicked mid-run
    #[error("internal error: {0}")]
    Internal(String),
}

impl ScrapeError {
    /// Stable name reported as `error_type` in failure envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Config(_) => "ConfigError",
            ScrapeError::InvalidUrl { .. } => "InvalidUrl",
            ScrapeError::TransportSetup(_) => "TransportSetupError",
            ScrapeError::Serialize(_) => "SerializeError",
            ScrapeError::Internal(_) => "InternalError",
        }
    }
}

/// Errors raised by an [`HttpTransport`](crate::traits::transport::HttpTransport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// The remote host could not be reached
    #[error("connection failed: {0}")]
    Connection(String),

    /// Anything else the client reported (body decode, redirect loop, ...)
    #[error("transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Configuration problems, mostly from environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },

    /// A numeric setting that must be positive was zero
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Result type alias for pipeline-level operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;
