//! Sliding-window rate limiting for outbound chat calls
//!
//! A [`RateLimiter`] admits at most `max_calls` calls in any trailing
//! `period`. Callers never get rejected; they wait until the oldest
//! retained call leaves the window.
//!
//! The window lock is held across the wait. `tokio::sync::Mutex` queues
//! waiters in FIFO order, so admission order matches arrival order and
//! the window can never hold more than `max_calls` live timestamps.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{self, Instant};

use subsin_config::RateLimitConfig;

/// Single sliding window
#[derive(Debug)]
pub struct RateLimiter {
    name: &'static str,
    max_calls: usize,
    period: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter admitting `max_calls` per `period`
    ///
    /// `max_calls` of zero is treated as one.
    pub fn new(name: &'static str, max_calls: usize, period: Duration) -> Self {
        let max_calls = max_calls.max(1);
        Self {
            name,
            max_calls,
            period,
            calls: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait until a call is admitted, then record it
    pub async fn acquire(&self) {
        let mut calls = self.calls.lock().await;

        loop {
            let now = Instant::now();
            while calls
                .front()
                .is_some_and(|&t| now.duration_since(t) >= self.period)
            {
                calls.pop_front();
            }

            if calls.len() < self.max_calls {
                break;
            }

            let Some(&oldest) = calls.front() else {
                break;
            };
            let wait = self.period.saturating_sub(now.duration_since(oldest));
            tracing::debug!(
                limiter = self.name,
                wait_ms = wait.as_millis() as u64,
                "Rate limit reached, waiting"
            );
            metrics::counter!("subsin_rate_limit_waits_total", "window" => self.name).increment(1);
            time::sleep(wait).await;
        }

        calls.push_back(Instant::now());
    }

    /// Calls currently inside the window
    pub async fn in_flight(&self) -> usize {
        let calls = self.calls.lock().await;
        let now = Instant::now();
        calls
            .iter()
            .filter(|&&t| now.duration_since(t) < self.period)
            .count()
    }
}

/// Per-second and per-minute windows applied together
///
/// Both windows must admit a call before it proceeds.
#[derive(Debug)]
pub struct ChatRateLimiter {
    per_second: RateLimiter,
    per_minute: RateLimiter,
}

impl ChatRateLimiter {
    pub fn new(per_second: usize, per_minute: usize) -> Self {
        Self {
            per_second: RateLimiter::new("per_second", per_second, Duration::from_secs(1)),
            per_minute: RateLimiter::new("per_minute", per_minute, Duration::from_secs(60)),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.per_second, config.per_minute)
    }

    /// Pass both gates
    pub async fn acquire(&self) {
        self.per_second.acquire().await;
        self.per_minute.acquire().await;
    }

    pub fn per_second(&self) -> &RateLimiter {
        &self.per_second
    }

    pub fn per_minute(&self) -> &RateLimiter {
        &self.per_minute
    }
}

impl Default for ChatRateLimiter {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}
