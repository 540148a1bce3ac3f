//! Short link entity: the mapping between a code and its destination URL.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A shortened URL with its click-tracking state.
///
/// `click_count` only ever increases, and only as part of a successful
/// resolve. For one-time links, `consumed_at` transitions from `None` to
/// `Some` at most once; no resolve reports success after that transition.
#[derive(Debug, Clone, Serialize)]
pub struct ShortLink {
    pub code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub click_count: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub one_time: bool,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl ShortLink {
    /// Returns true if the link has passed its expiry time at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| e <= now)
    }

    /// Returns true if this is a one-time link that has already been used.
    pub fn is_consumed(&self) -> bool {
        self.one_time && self.consumed_at.is_some()
    }
}

/// Input data for creating a new short link.
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub code: String,
    pub original_url: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub one_time: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link(expires_at: Option<DateTime<Utc>>, one_time: bool) -> ShortLink {
        ShortLink {
            code: "abc123".to_string(),
            original_url: "https://example.com".to_string(),
            created_at: Utc::now(),
            click_count: 0,
            last_clicked_at: None,
            expires_at,
            one_time,
            consumed_at: None,
        }
    }

    #[test]
    fn test_never_expires_without_expiry() {
        assert!(!link(None, false).is_expired(Utc::now()));
    }

    #[test]
    fn test_expired_in_the_past() {
        let now = Utc::now();
        assert!(link(Some(now - Duration::seconds(1)), false).is_expired(now));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let now = Utc::now();
        assert!(link(Some(now), false).is_expired(now));
    }

    #[test]
    fn test_not_expired_in_the_future() {
        let now = Utc::now();
        assert!(!link(Some(now + Duration::hours(1)), false).is_expired(now));
    }

    #[test]
    fn test_consumed_requires_one_time() {
        let mut l = link(None, false);
        l.consumed_at = Some(Utc::now());
        assert!(!l.is_consumed());

        let mut l = link(None, true);
        assert!(!l.is_consumed());
        l.consumed_at = Some(Utc::now());
        assert!(l.is_consumed());
    }
}
