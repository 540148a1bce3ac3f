//! Fixed-window rate limit bucket storage.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::Duration;

/// Outcome of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub ok: bool,
    pub remaining: u32,
    /// Advisory backoff hint, computed from the bucket's reset time.
    pub retry_after_seconds: u64,
}

/// Fixed-window counter keyed by caller identity.
///
/// Each `check` call counts one request against the window for `key`. When
/// the window has elapsed the bucket resets and counting starts over.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn check(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
    ) -> Result<RateLimitDecision, AppError>;
}
