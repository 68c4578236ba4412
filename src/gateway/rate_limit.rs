//! Per-provider admission control.
//!
//! Two limits apply at once: at most `max_requests` admissions inside any
//! rolling window, and a minimum spacing of `1 / max_rps` between consecutive
//! admissions. The spacing half is a [`governor`] GCRA limiter with a burst of
//! one; the window half is a queue of recent admission instants.
//!
//! Callers are delayed, never rejected. The admission decision is taken while
//! holding a fair async mutex, so waiters are admitted in arrival order.

use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::Quota;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

use crate::config::RateLimitConfig;

/// Sliding-window plus max-rate limiter owned by one provider client.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    issued: Mutex<VecDeque<Instant>>,
    spacing: governor::RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl RateLimiter {
    /// Create a limiter admitting `max_requests` per `window`, spaced at most
    /// `max_rps` per second. Zero values are clamped to one.
    pub fn new(max_requests: u32, window: Duration, max_rps: u32) -> Self {
        let rps = NonZeroU32::new(max_rps).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(rps).allow_burst(NonZeroU32::MIN);

        Self {
            max_requests: max_requests.max(1) as usize,
            window: window.max(Duration::from_millis(1)),
            issued: Mutex::new(VecDeque::new()),
            spacing: governor::RateLimiter::direct(quota),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.max_requests,
            Duration::from_millis(config.window_ms),
            config.max_rps,
        )
    }

    /// Wait until a request may be issued, then record the admission.
    pub async fn acquire(&self) {
        let mut issued = self.issued.lock().await;

        loop {
            let now = Instant::now();
            while issued
                .front()
                .is_some_and(|at| now.duration_since(*at) >= self.window)
            {
                issued.pop_front();
            }

            if issued.len() < self.max_requests {
                break;
            }

            let Some(oldest) = issued.front().copied() else {
                break;
            };
            let wait = self.window.saturating_sub(now.duration_since(oldest));
            trace!(wait_ms = wait.as_millis() as u64, "rate limit window full, waiting");
            tokio::time::sleep(wait).await;
        }

        self.spacing.until_ready().await;
        issued.push_back(Instant::now());
    }

    /// Admissions recorded in the current window.
    pub async fn admitted_in_window(&self) -> usize {
        let issued = self.issued.lock().await;
        let now = Instant::now();
        issued
            .iter()
            .filter(|at| now.duration_since(**at) < self.window)
            .count()
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max_requests", &self.max_requests)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}
