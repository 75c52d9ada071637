//! Rate limiter implementation
//!
//! Provides sliding window rate limiting per client identifier.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{Clock, SystemClock};

/// Quota and window for the limiter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests admitted per identifier within one window
    pub requests_per_window: u32,
    /// Length of the sliding window
    pub window: Duration,
    /// How often identifiers with no live timestamps are dropped
    pub sweep_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 10,
            window: Duration::seconds(60),
            sweep_interval: Duration::minutes(5),
        }
    }
}

impl RateLimitConfig {
    pub fn new(requests_per_window: u32, window: Duration) -> Self {
        Self {
            requests_per_window,
            window,
            ..Default::default()
        }
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

/// Result of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    /// Whether the request is allowed
    pub success: bool,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Total limit for the window
    pub limit: u32,
    /// When the oldest request leaves the window (rejections only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitDecision {
    /// Whole seconds until `reset_at`, rounded up, at least 1
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> u64 {
        self.reset_at
            .map(|reset| {
                let millis = (reset - now).num_milliseconds().max(0) as u64;
                millis.div_ceil(1000).max(1)
            })
            .unwrap_or(0)
    }
}

/// Sliding window rate limiter keyed by an opaque identifier
#[derive(Debug)]
pub struct RateLimiter {
    /// Per-identifier request timestamps, oldest first
    records: RwLock<HashMap<String, VecDeque<DateTime<Utc>>>>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    last_sweep: RwLock<DateTime<Utc>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();

        Self {
            records: RwLock::new(HashMap::new()),
            config,
            clock,
            last_sweep: RwLock::new(now),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Check and record in one operation
    pub async fn allow(&self, identifier: &str) -> RateLimitDecision {
        let now = self.clock.now();
        self.maybe_sweep(now).await;

        let limit = self.config.requests_per_window;
        let cutoff = now - self.config.window;

        let mut records = self.records.write().await;
        let timestamps = records.entry(identifier.to_string()).or_default();

        while timestamps.front().is_some_and(|t| *t <= cutoff) {
            timestamps.pop_front();
        }

        if timestamps.len() as u32 >= limit {
            let reset_at = timestamps.front().map(|oldest| *oldest + self.config.window);

            debug!(identifier = %identifier, limit, "Rate limit exceeded");

            return RateLimitDecision {
                success: false,
                remaining: 0,
                limit,
                reset_at,
            };
        }

        timestamps.push_back(now);

        RateLimitDecision {
            success: true,
            remaining: limit.saturating_sub(timestamps.len() as u32),
            limit,
            reset_at: None,
        }
    }

    /// Forget everything recorded for an identifier
    pub async fn reset(&self, identifier: &str) {
        let mut records = self.records.write().await;
        records.remove(identifier);
    }

    /// Number of identifiers currently held in memory
    pub async fn tracked_identifiers(&self) -> usize {
        self.records.read().await.len()
    }

    /// Drop expired timestamps and identifiers left with none
    pub async fn sweep(&self) {
        let now = self.clock.now();
        let cutoff = now - self.config.window;

        let mut records = self.records.write().await;

        for timestamps in records.values_mut() {
            timestamps.retain(|t| *t > cutoff);
        }

        let before = records.len();
        records.retain(|_, v| !v.is_empty());

        debug!(removed = before - records.len(), "Rate limiter sweep finished");
    }

    async fn maybe_sweep(&self, now: DateTime<Utc>) {
        let should_sweep = {
            let last = self.last_sweep.read().await;
            now - *last >= self.config.sweep_interval
        };

        if should_sweep {
            *self.last_sweep.write().await = now;
            self.sweep().await;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
