//! Global pacing budget shared by detail workers.
//!
//! A lookup may start only when two conditions hold: one interval has
//! passed since the previous start, and one interval has passed since the
//! most recent completion. With a single worker this is a fixed pause
//! between the end of one lookup and the start of the next; with several,
//! starts stay one interval apart and never crowd a finished lookup.

use governor::{Quota, RateLimiter};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

struct Budget {
    interval: Duration,
    /// Spaces starts
    limiter: DefaultRateLimiter,
    /// Earliest next start, pushed out by each completion
    ready_at: Mutex<Option<Instant>>,
}

impl Budget {
    fn ready_at(&self) -> Option<Instant> {
        *self.ready_at.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared request pacer. Cloning shares the budget.
#[derive(Clone)]
pub struct Pacer {
    budget: Option<Arc<Budget>>,
}

impl Pacer {
    /// One interval between lookups. A zero interval disables pacing.
    pub fn new(interval: Duration) -> Self {
        let budget = Quota::with_period(interval).map(|quota| {
            Arc::new(Budget {
                interval,
                limiter: RateLimiter::direct(quota),
                ready_at: Mutex::new(None),
            })
        });
        Self { budget }
    }

    /// A pacer that never waits.
    pub fn unlimited() -> Self {
        Self { budget: None }
    }

    pub fn is_unlimited(&self) -> bool {
        self.budget.is_none()
    }

    /// Wait until the next lookup may start.
    pub async fn wait(&self) {
        let Some(budget) = &self.budget else {
            return;
        };
        loop {
            if let Some(at) = budget.ready_at() {
                tokio::time::sleep_until(at).await;
            }
            budget.limiter.until_ready().await;
            // A completion may have landed while waiting for the permit
            if budget.ready_at().map_or(true, |at| at <= Instant::now()) {
                return;
            }
        }
    }

    /// Record a finished lookup; the next start waits one interval from now.
    pub fn complete(&self) {
        let Some(budget) = &self.budget else {
            return;
        };
        let next = Instant::now() + budget.interval;
        let mut ready_at = budget.ready_at.lock().unwrap_or_else(PoisonError::into_inner);
        *ready_at = Some(ready_at.map_or(next, |at| at.max(next)));
    }
}
