//! Resilient request executor.
//!
//! Sends one request with bounded retries. Failures come back as a value,
//! never as an error: callers match on [`FetchOutcome`] and decide how to
//! degrade.
//!
//! | Failure                         | Retried | Delay before next attempt   |
//! |---------------------------------|---------|-----------------------------|
//! | timeout / connection / other    | yes     | `base_delay * 2^attempt`    |
//! | HTTP 429                        | yes     | `base_delay * 3^attempt`    |
//! | HTTP 403, 404                   | no      | -                           |
//! | any other non-2xx status        | yes     | `base_delay * 2^attempt`    |

use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::TransportError;
use crate::traits::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::types::config::RetryPolicy;

/// Why a request produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Connection(String),
    /// Transport failure that is neither a timeout nor a connect error
    Transport(String),
    /// HTTP 429 on the final attempt
    RateLimited,
    /// HTTP 403 or 404; never retried
    Permanent { status: u16 },
    /// Any other non-2xx status on the final attempt
    HttpStatus { status: u16 },
}

impl FailureKind {
    /// Whether another attempt could change the result.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FailureKind::Permanent { .. })
    }

    fn from_transport(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => FailureKind::Timeout,
            TransportError::Connection(msg) => FailureKind::Connection(msg),
            TransportError::Other(msg) => FailureKind::Transport(msg),
        }
    }
}

/// Result of [`RequestExecutor::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success {
        response: HttpResponse,
        attempts: u32,
    },
    Failed {
        failure: FailureKind,
        attempts: u32,
    },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }

    /// Attempts made, including the successful one.
    pub fn attempts(&self) -> u32 {
        match self {
            FetchOutcome::Success { attempts, .. } | FetchOutcome::Failed { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn failure(&self) -> Option<&FailureKind> {
        match self {
            FetchOutcome::Failed { failure, .. } => Some(failure),
            FetchOutcome::Success { .. } => None,
        }
    }

    /// The response, or `None` for any failure.
    pub fn into_response(self) -> Option<HttpResponse> {
        match self {
            FetchOutcome::Success { response, .. } => Some(response),
            FetchOutcome::Failed { .. } => None,
        }
    }
}

/// What to do after one attempt.
enum Step {
    Done(FetchOutcome),
    Retry { failure: FailureKind, delay: Duration },
}

/// Sends requests through a transport with retry and backoff.
pub struct RequestExecutor<T: HttpTransport> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: HttpTransport> RequestExecutor<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute with the configured retry policy.
    pub async fn execute(&self, request: &HttpRequest) -> FetchOutcome {
        self.execute_with(request, &self.policy).await
    }

    /// Execute with an explicit retry policy for this call only.
    pub async fn execute_with(&self, request: &HttpRequest, policy: &RetryPolicy) -> FetchOutcome {
        let max_attempts = policy.max_attempts.max(1);
        let mut last_failure = FailureKind::Transport("no attempt made".into());

        for attempt in 0..max_attempts {
            info!(
                method = %request.method,
                url = %request.url,
                attempt = attempt + 1,
                max_attempts,
                "Sending request"
            );

            let result = self.transport.send(request).await;
            match classify(result, attempt, policy) {
                Step::Done(outcome) => {
                    match &outcome {
                        FetchOutcome::Success { .. } => {
                            info!(method = %request.method, url = %request.url, attempt = attempt + 1, "Request succeeded");
                        }
                        FetchOutcome::Failed { failure, .. } => {
                            error!(url = %request.url, attempt = attempt + 1, failure = ?failure, "Request failed permanently, not retrying");
                        }
                    }
                    return outcome;
                }
                Step::Retry { failure, delay } => {
                    warn!(
                        url = %request.url,
                        attempt = attempt + 1,
                        failure = ?failure,
                        "Request attempt failed"
                    );
                    last_failure = failure;
                    if attempt + 1 < max_attempts && !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        error!(
            url = %request.url,
            attempts = max_attempts,
            failure = ?last_failure,
            "All attempts failed"
        );
        FetchOutcome::Failed {
            failure: last_failure,
            attempts: max_attempts,
        }
    }
}

fn classify(
    result: Result<HttpResponse, TransportError>,
    attempt: u32,
    policy: &RetryPolicy,
) -> Step {
    let attempts = attempt + 1;
    match result {
        Ok(response) if response.is_success() => Step::Done(FetchOutcome::Success {
            response,
            attempts,
        }),
        Ok(response) => match response.status {
            429 => Step::Retry {
                failure: FailureKind::RateLimited,
                delay: policy.rate_limit_delay(attempt),
            },
            403 | 404 => Step::Done(FetchOutcome::Failed {
                failure: FailureKind::Permanent {
                    status: response.status,
                },
                attempts,
            }),
            status => Step::Retry {
                failure: FailureKind::HttpStatus { status },
                delay: policy.backoff_delay(attempt),
            },
        },
        Err(err) => Step::Retry {
            failure: FailureKind::from_transport(err),
            delay: policy.backoff_delay(attempt),
        },
    }
}
