//! In-process implementation of the fixed-window rate limit store.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::repositories::{RateLimitDecision, RateLimitStore};
use crate::error::AppError;

#[derive(Debug, Clone, Copy)]
struct Bucket {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// Process-local bucket store. Counters reset on restart.
#[derive(Default)]
pub struct MemoryRateLimitStore {
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn check(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
    ) -> Result<RateLimitDecision, AppError> {
        let now = Utc::now();
        let window_seconds = window.num_seconds().max(1) as u64;

        let mut buckets = self
            .buckets
            .lock()
            .map_err(|_| AppError::internal("Rate limit lock poisoned", serde_json::json!({})))?;

        let bucket = buckets.get(key).copied();

        match bucket {
            Some(b) if b.reset_at > now => {
                let retry_after_seconds = (b.reset_at - now).num_seconds().max(1) as u64;

                if b.count >= limit {
                    return Ok(RateLimitDecision {
                        ok: false,
                        remaining: 0,
                        retry_after_seconds,
                    });
                }

                buckets.insert(
                    key.to_string(),
                    Bucket {
                        count: b.count + 1,
                        reset_at: b.reset_at,
                    },
                );

                Ok(RateLimitDecision {
                    ok: true,
                    remaining: limit.saturating_sub(b.count + 1),
                    retry_after_seconds,
                })
            }
            _ => {
                buckets.insert(
                    key.to_string(),
                    Bucket {
                        count: 1,
                        reset_at: now + window,
                    },
                );

                Ok(RateLimitDecision {
                    ok: true,
                    remaining: limit.saturating_sub(1),
                    retry_after_seconds: window_seconds,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_down_to_denial() {
        let store = MemoryRateLimitStore::new();
        let window = Duration::seconds(60);

        for expected_remaining in [2u32, 1, 0] {
            let d = store.check("create:1.2.3.4", 3, window).await.unwrap();
            assert!(d.ok);
            assert_eq!(d.remaining, expected_remaining);
        }

        let denied = store.check("create:1.2.3.4", 3, window).await.unwrap();
        assert!(!denied.ok);
        assert_eq!(denied.remaining, 0);
        assert!(denied.retry_after_seconds >= 1);
        assert!(denied.retry_after_seconds <= 60);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = MemoryRateLimitStore::new();
        let window = Duration::seconds(60);

        let first = store.check("create:a", 1, window).await.unwrap();
        assert!(first.ok);
        let denied = store.check("create:a", 1, window).await.unwrap();
        assert!(!denied.ok);

        let other = store.check("create:b", 1, window).await.unwrap();
        assert!(other.ok);
    }

    #[tokio::test]
    async fn test_window_elapse_resets_bucket() {
        let store = MemoryRateLimitStore::new();
        let window = Duration::milliseconds(50);

        let first = store.check("update:x", 1, window).await.unwrap();
        assert!(first.ok);
        let denied = store.check("update:x", 1, window).await.unwrap();
        assert!(!denied.ok);

        tokio::time::sleep(std::time::Duration::from_millis(80)).await;

        let after = store.check("update:x", 1, window).await.unwrap();
        assert!(after.ok);
    }
}
