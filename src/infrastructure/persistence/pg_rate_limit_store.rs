//! PostgreSQL implementation of the fixed-window rate limit store.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::{RateLimitDecision, RateLimitStore};
use crate::error::AppError;

/// Bucket store over the `rate_limit_buckets` table.
///
/// Each check runs in a transaction with the bucket row locked, so
/// concurrent requests for the same key count serially.
pub struct PgRateLimitStore {
    pool: Arc<PgPool>,
}

impl PgRateLimitStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RateLimitStore for PgRateLimitStore {
    async fn check(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
    ) -> Result<RateLimitDecision, AppError> {
        let now = Utc::now();
        let new_reset_at = now + window;
        let window_seconds = window.num_seconds().max(1) as u64;

        let mut tx = self.pool.begin().await?;

        let existing: Option<(i64, DateTime<Utc>)> = sqlx::query_as(
            "SELECT count, reset_at FROM rate_limit_buckets WHERE key = $1 FOR UPDATE",
        )
        .bind(key)
        .fetch_optional(&mut *tx)
        .await?;

        let decision = match existing {
            // Live bucket: deny at the limit, count otherwise.
            Some((count, reset_at)) if reset_at > now => {
                let retry_after_seconds = (reset_at - now).num_seconds().max(1) as u64;

                if count >= i64::from(limit) {
                    RateLimitDecision {
                        ok: false,
                        remaining: 0,
                        retry_after_seconds,
                    }
                } else {
                    sqlx::query("UPDATE rate_limit_buckets SET count = count + 1 WHERE key = $1")
                        .bind(key)
                        .execute(&mut *tx)
                        .await?;

                    RateLimitDecision {
                        ok: true,
                        remaining: limit.saturating_sub(count as u32 + 1),
                        retry_after_seconds,
                    }
                }
            }
            // No bucket yet, or the window has elapsed: start a fresh one.
            _ => {
                sqlx::query(
                    "INSERT INTO rate_limit_buckets (key, count, reset_at) \
                     VALUES ($1, 1, $2) \
                     ON CONFLICT (key) DO UPDATE SET count = 1, reset_at = $2",
                )
                .bind(key)
                .bind(new_reset_at)
                .execute(&mut *tx)
                .await?;

                RateLimitDecision {
                    ok: true,
                    remaining: limit.saturating_sub(1),
                    retry_after_seconds: window_seconds,
                }
            }
        };

        tx.commit().await?;

        Ok(decision)
    }
}
