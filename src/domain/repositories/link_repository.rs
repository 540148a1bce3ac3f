//! Repository trait for short link data access.

use crate::domain::entities::{ListQuery, NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Storage contract for short links.
///
/// Implementations must provide true atomicity for [`create`] and
/// [`conditional_increment`] — either serializable transactions or
/// single-statement conditional updates — because the resolver relies on the
/// store, not in-process locking, to serialize concurrent clicks on the same
/// code.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - in-process
/// - Test mocks available with `cfg(test)`
///
/// [`create`]: LinkRepository::create
/// [`conditional_increment`]: LinkRepository::conditional_increment
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code already exists; the row is
    /// not partially written in that case. Returns [`AppError::Internal`] on
    /// storage errors.
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds a link by its short code.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError>;

    /// Atomically counts a click iff the link is still valid at `now`.
    ///
    /// The precondition — row exists, not expired at `now`, and (when
    /// `mark_consumed`) not yet consumed — is checked atomically with the
    /// write. On success the update increments `click_count`, sets
    /// `last_clicked_at = now`, and sets `consumed_at = now` when
    /// `mark_consumed`.
    ///
    /// Returns the number of rows affected (0 or 1). A zero result means the
    /// precondition did not hold at write time; the caller must re-read the
    /// row to classify why.
    async fn conditional_increment(
        &self,
        code: &str,
        now: DateTime<Utc>,
        mark_consumed: bool,
    ) -> Result<u64, AppError>;

    /// Replaces the destination URL of an existing link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches `code`.
    async fn update_destination(&self, code: &str, new_url: &str) -> Result<ShortLink, AppError>;

    /// Deletes a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches `code`.
    async fn delete(&self, code: &str) -> Result<(), AppError>;

    /// Lists links with filtering and ordering per [`ListQuery`].
    async fn list(&self, query: ListQuery) -> Result<Vec<ShortLink>, AppError>;

    /// Liveness probe for the health endpoint.
    async fn ping(&self) -> Result<(), AppError>;
}
