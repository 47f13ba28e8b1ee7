//! Rate Limiter
//!
//! Admission control over the counter store. Every decision is made
//! before any store access by the caller; a disabled limiter admits
//! everything.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::quota::QuotaClass;
use super::store::{CounterKey, CounterStore};

/// Outcome of an admission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Whether the request is admitted
    pub allowed: bool,

    /// Requests left in the current window after this one
    pub remaining: u32,

    /// Seconds until the window rolls over (set when rejected)
    pub retry_after_secs: Option<u64>,
}

impl Decision {
    /// An admitted request
    pub fn allowed(remaining: u32) -> Self {
        Self {
            allowed: true,
            remaining,
            retry_after_secs: None,
        }
    }

    /// A rejected request
    pub fn denied(retry_after_secs: u64) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            retry_after_secs: Some(retry_after_secs),
        }
    }
}

/// Fixed-window rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// When false, every check is admitted
    enabled: bool,

    /// Window counters
    store: CounterStore,
}

impl RateLimiter {
    /// Create an enabled rate limiter
    pub fn new() -> Self {
        Self {
            enabled: true,
            store: CounterStore::new(),
        }
    }

    /// Create a disabled rate limiter (for testing)
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            store: CounterStore::new(),
        }
    }

    /// Check and count a request against the current wall-clock window
    pub async fn check_and_consume(&self, client_id: &str, class: QuotaClass) -> Decision {
        self.check_and_consume_at(client_id, class, Utc::now()).await
    }

    /// Check and count a request against the window containing `at`
    pub async fn check_and_consume_at(
        &self,
        client_id: &str,
        class: QuotaClass,
        at: DateTime<Utc>,
    ) -> Decision {
        if !self.enabled {
            return Decision::allowed(u32::MAX);
        }

        let window = class.window_index(at);
        let key = CounterKey::new(client_id, class);
        let (admitted, count) = self
            .store
            .check_and_increment(key, class.usage_per_unit, window)
            .await;

        if admitted {
            Decision::allowed(class.usage_per_unit - count)
        } else {
            let retry_after = class.secs_until_rollover(at);
            debug!(
                client_id,
                usage_per_unit = class.usage_per_unit,
                retry_after,
                "rate limit exceeded"
            );
            Decision::denied(retry_after)
        }
    }

    /// Drop all counters for one client
    pub async fn reset_client(&self, client_id: &str) {
        self.store.reset_client(client_id).await;
    }

    /// Drop all counters globally
    pub async fn reset_all(&self) {
        self.store.clear().await;
    }

    /// Number of live counters (diagnostics)
    pub async fn tracked(&self) -> usize {
        self.store.len().await
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
