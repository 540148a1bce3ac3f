//! Per-action rate limiting over a fixed-window bucket store.

use std::sync::Arc;

use chrono::Duration;

use crate::domain::repositories::RateLimitStore;
use crate::error::AppError;

/// Per-action request limits within one fixed window.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitSettings {
    pub window_seconds: i64,
    pub create_limit: u32,
    pub update_limit: u32,
    pub delete_limit: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_seconds: 60,
            create_limit: 20,
            update_limit: 60,
            delete_limit: 20,
        }
    }
}

/// Consults the bucket store before mutating entry points run.
///
/// Keys are `{action}:{ip}` so each action gets its own budget per caller.
/// A denied check surfaces as [`AppError::RateLimited`] carrying the
/// advisory `Retry-After` computed from the bucket's reset time.
pub struct RateLimitService {
    store: Arc<dyn RateLimitStore>,
    settings: RateLimitSettings,
}

impl RateLimitService {
    pub fn new(store: Arc<dyn RateLimitStore>, settings: RateLimitSettings) -> Self {
        Self { store, settings }
    }

    pub async fn check_create(&self, ip: &str) -> Result<(), AppError> {
        self.check("create", ip, self.settings.create_limit).await
    }

    pub async fn check_update(&self, ip: &str) -> Result<(), AppError> {
        self.check("update", ip, self.settings.update_limit).await
    }

    pub async fn check_delete(&self, ip: &str) -> Result<(), AppError> {
        self.check("delete", ip, self.settings.delete_limit).await
    }

    async fn check(&self, action: &str, ip: &str, limit: u32) -> Result<(), AppError> {
        let key = format!("{action}:{ip}");
        let decision = self
            .store
            .check(&key, limit, Duration::seconds(self.settings.window_seconds))
            .await?;

        if decision.ok {
            return Ok(());
        }

        tracing::info!(event = "rate_limit", action, ip, "request rejected");
        Err(AppError::rate_limited(
            decision.retry_after_seconds,
            decision.remaining,
        ))
    }
}
