//! The click-resolution core: atomic resolve-and-track for short codes.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::entities::ShortLink;
use crate::domain::repositories::LinkRepository;
use crate::domain::resolve::ResolveOutcome;
use crate::error::AppError;

/// Resolves short codes while enforcing expiry and one-time consumption.
///
/// The service is stateless; every call re-reads the store and carries its
/// own `now`, captured once so that the expiry and consumption checks within
/// a single resolve are internally consistent.
pub struct ResolverService {
    links: Arc<dyn LinkRepository>,
}

impl ResolverService {
    pub fn new(links: Arc<dyn LinkRepository>) -> Self {
        Self { links }
    }

    /// Resolves `code` and, if the link is valid, counts the click.
    ///
    /// # State machine
    ///
    /// Checks run in strict order: absent → `NotFound`; expired → `Expired`
    /// (before consumption); one-time and already consumed → `Consumed`;
    /// otherwise the conditional increment is attempted with
    /// `mark_consumed = one_time`.
    ///
    /// The read alone is not authoritative: two concurrent clicks on a
    /// one-time link can both observe `consumed_at = None`. The store checks
    /// the same precondition again atomically with the write, so at most one
    /// of them applies. A zero-row result means a concurrent resolver won the
    /// race (or the link expired between read and write); the row is re-read
    /// and reclassified with the same ordered checks so the race resolves to
    /// a deterministic outcome instead of a generic error.
    ///
    /// # Errors
    ///
    /// Only store I/O failures propagate; every business outcome is a
    /// [`ResolveOutcome`].
    pub async fn resolve_and_track(&self, code: &str) -> Result<ResolveOutcome, AppError> {
        let now = Utc::now();

        let Some(link) = self.links.find_by_code(code).await? else {
            return Ok(ResolveOutcome::NotFound);
        };

        if let Some(outcome) = Self::reject_invalid(&link, now) {
            return Ok(outcome);
        }

        let applied = self
            .links
            .conditional_increment(code, now, link.one_time)
            .await?;

        if applied == 1 {
            return Ok(ResolveOutcome::Success {
                original_url: link.original_url,
            });
        }

        // Lost the race: re-read and classify against the same `now`.
        match self.links.find_by_code(code).await? {
            None => Ok(ResolveOutcome::NotFound),
            Some(fresh) => match Self::reject_invalid(&fresh, now) {
                Some(outcome) => Ok(outcome),
                // The precondition failed but the re-read shows a live row.
                // For one-time links the winner's consumed_at may not be
                // visible yet; classify the way the failed precondition
                // implies.
                None if fresh.one_time => Ok(ResolveOutcome::Consumed),
                None => Ok(ResolveOutcome::Expired),
            },
        }
    }

    /// Ordered validity checks shared by the first read and the re-read.
    fn reject_invalid(link: &ShortLink, now: DateTime<Utc>) -> Option<ResolveOutcome> {
        if link.is_expired(now) {
            return Some(ResolveOutcome::Expired);
        }
        if link.is_consumed() {
            return Some(ResolveOutcome::Consumed);
        }
        None
    }
}
