//! Shared request budget for engine calls
//!
//! Every engine call first takes a concurrency permit, then waits for the
//! per-minute governor. On a rate-limit response the governor is swapped
//! for a slower one; 60 seconds without another rate limit restores the
//! configured rate.

use crate::error::ExtractorError;
use arc_swap::ArcSwap;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{info, warn};

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const MAX_SLOWDOWN: u32 = 16;
const RESTORE_AFTER: Duration = Duration::from_secs(60);

/// Rate and concurrency budget shared by all workers of a run
pub struct RequestBudget {
    limiter: ArcSwap<DirectLimiter>,
    base_period: Duration,
    factor: AtomicU32,
    last_rate_limited: Mutex<Option<Instant>>,
    in_flight: Semaphore,
}

impl RequestBudget {
    /// Budget allowing `requests_per_minute` calls with at most `max_concurrent` in flight
    pub fn new(requests_per_minute: u32, max_concurrent: usize) -> Self {
        let base_period = Duration::from_secs(60) / requests_per_minute.max(1);
        Self {
            limiter: ArcSwap::from(Arc::new(DirectLimiter::direct(quota_for(base_period)))),
            base_period,
            factor: AtomicU32::new(1),
            last_rate_limited: Mutex::new(None),
            in_flight: Semaphore::new(max_concurrent.max(1)),
        }
    }

    /// Wait for a concurrency slot and a quota cell
    ///
    /// The returned permit holds the slot until dropped.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>, ExtractorError> {
        let permit = self
            .in_flight
            .acquire()
            .await
            .map_err(|_| ExtractorError::BudgetClosed)?;
        self.try_restore();
        let limiter = self.limiter.load();
        limiter.until_ready().await;
        Ok(permit)
    }

    /// Record a rate-limit response: halve the rate, down to 1/16 of the base
    pub fn on_rate_limited(&self) {
        if let Ok(mut last) = self.last_rate_limited.lock() {
            *last = Some(Instant::now());
        }

        let previous = self
            .factor
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |f| {
                Some((f * 2).min(MAX_SLOWDOWN))
            })
            .unwrap_or(MAX_SLOWDOWN);
        let factor = (previous * 2).min(MAX_SLOWDOWN);

        if factor != previous {
            self.swap_rate(factor);
            warn!(slowdown = factor, "Engine rate limited; reducing request rate");
        }
    }

    /// Current slowdown factor (1 = configured rate)
    pub fn slowdown(&self) -> u32 {
        self.factor.load(Ordering::SeqCst)
    }

    /// Engine calls currently allowed to start
    pub fn available_slots(&self) -> usize {
        self.in_flight.available_permits()
    }

    /// Refuse further acquisitions
    pub fn close(&self) {
        self.in_flight.close();
    }

    fn try_restore(&self) {
        let expired = self
            .last_rate_limited
            .lock()
            .ok()
            .and_then(|last| last.map(|t| t.elapsed() >= RESTORE_AFTER))
            .unwrap_or(false);

        if expired && self.factor.swap(1, Ordering::SeqCst) > 1 {
            self.swap_rate(1);
            info!("Restored configured request rate");
        }
    }

    fn swap_rate(&self, factor: u32) {
        let period = self.base_period.saturating_mul(factor);
        self.limiter
            .store(Arc::new(DirectLimiter::direct(quota_for(period))));
    }
}

fn quota_for(period: Duration) -> Quota {
    Quota::with_period(period).unwrap_or_else(|| Quota::per_minute(NonZeroU32::MIN))
}
