//! Link creation and management service.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use crate::domain::entities::{ListQuery, NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{DEFAULT_CODE_LENGTH, generate_code, validate_custom_code};
use crate::utils::url_validator::{UrlPolicy, normalize_and_validate_url};

/// Longest accepted TTL: 365 days.
const MAX_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

/// How many fresh random codes to try before giving up on creation.
const MAX_CREATE_ATTEMPTS: usize = 10;

/// Options accepted by [`LinkService::create_short_link`].
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub custom_code: Option<String>,
    pub ttl_seconds: Option<i64>,
    pub one_time: bool,
}

/// Service for creating and managing short links.
///
/// Validates destination URLs, allocates collision-free codes, and exposes
/// the update/delete/list operations. Click resolution lives in
/// [`crate::application::services::ResolverService`].
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    url_policy: UrlPolicy,
}

impl LinkService {
    pub fn new(links: Arc<dyn LinkRepository>, url_policy: UrlPolicy) -> Self {
        Self { links, url_policy }
    }

    /// Creates a short link for `original_url`.
    ///
    /// # Code allocation
    ///
    /// - With `custom_code`: validated once, then a single create attempt.
    ///   A uniqueness conflict is surfaced to the caller as a distinct
    ///   "already exists" error — the caller chose the value, so no retry.
    /// - Without: a fresh 6-character random code per attempt, retrying only
    ///   on uniqueness conflicts, up to 10 attempts. Exhausting the retries
    ///   means a collision storm or a store failure and is reported as
    ///   [`AppError::Internal`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a bad URL, bad custom code, or
    /// bad TTL, and [`AppError::Conflict`] for a taken custom code.
    pub async fn create_short_link(
        &self,
        original_url: &str,
        options: CreateOptions,
    ) -> Result<ShortLink, AppError> {
        let normalized_url = normalize_and_validate_url(original_url, self.url_policy)
            .map_err(|e| AppError::bad_request(e.to_string(), json!({})))?;

        let expires_at = options
            .ttl_seconds
            .map(|ttl| Self::expiry_from_ttl(ttl, Utc::now()))
            .transpose()?;

        if let Some(custom) = options.custom_code.as_deref() {
            let code = validate_custom_code(custom)?;

            return self
                .links
                .create(NewShortLink {
                    code: code.clone(),
                    original_url: normalized_url,
                    expires_at,
                    one_time: options.one_time,
                })
                .await
                .map_err(|e| match e {
                    AppError::Conflict { .. } => AppError::conflict(
                        "Custom code already exists",
                        json!({ "code": code }),
                    ),
                    other => other,
                });
        }

        for _ in 0..MAX_CREATE_ATTEMPTS {
            let code = generate_code(DEFAULT_CODE_LENGTH)?;

            match self
                .links
                .create(NewShortLink {
                    code,
                    original_url: normalized_url.clone(),
                    expires_at,
                    one_time: options.one_time,
                })
                .await
            {
                Ok(link) => return Ok(link),
                Err(AppError::Conflict { .. }) => continue,
                Err(other) => return Err(other),
            }
        }

        Err(AppError::internal(
            "Failed to allocate a unique short code",
            json!({ "attempts": MAX_CREATE_ATTEMPTS }),
        ))
    }

    /// Derives an absolute expiry from a TTL in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for non-positive TTLs or TTLs above
    /// the 365-day cap.
    fn expiry_from_ttl(ttl_seconds: i64, now: DateTime<Utc>) -> Result<DateTime<Utc>, AppError> {
        if ttl_seconds <= 0 {
            return Err(AppError::bad_request(
                "ttl_seconds must be positive",
                json!({ "ttl_seconds": ttl_seconds }),
            ));
        }
        if ttl_seconds > MAX_TTL_SECONDS {
            return Err(AppError::bad_request(
                "ttl_seconds is too large (max 365 days)",
                json!({ "ttl_seconds": ttl_seconds, "max": MAX_TTL_SECONDS }),
            ));
        }
        Ok(now + Duration::seconds(ttl_seconds))
    }

    /// Retrieves a link by its code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches.
    pub async fn get_link(&self, code: &str) -> Result<ShortLink, AppError> {
        self.links.find_by_code(code).await?.ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "code": code }))
        })
    }

    /// Replaces the destination URL of an existing link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a bad URL and
    /// [`AppError::NotFound`] for an unknown code.
    pub async fn update_destination(
        &self,
        code: &str,
        new_url: &str,
    ) -> Result<ShortLink, AppError> {
        let normalized_url = normalize_and_validate_url(new_url, self.url_policy)
            .map_err(|e| AppError::bad_request(e.to_string(), json!({})))?;

        self.links.update_destination(code, &normalized_url).await
    }

    /// Deletes a link. Subsequent resolves report `not_found`.
    pub async fn delete_link(&self, code: &str) -> Result<(), AppError> {
        self.links.delete(code).await
    }

    /// Lists links per the given filters and ordering.
    pub async fn list_links(&self, query: ListQuery) -> Result<Vec<ShortLink>, AppError> {
        self.links.list(query).await
    }

    /// Constructs the full short URL for a code.
    pub fn short_url(&self, base_url: &str, code: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), code)
    }

    /// Store liveness, surfaced by the health endpoint.
    pub async fn ping_store(&self) -> Result<(), AppError> {
        self.links.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use mockall::Sequence;

    fn stored(new_link: &NewShortLink) -> ShortLink {
        ShortLink {
            code: new_link.code.clone(),
            original_url: new_link.original_url.clone(),
            created_at: Utc::now(),
            click_count: 0,
            last_clicked_at: None,
            expires_at: new_link.expires_at,
            one_time: new_link.one_time,
            consumed_at: None,
        }
    }

    fn service(mock: MockLinkRepository) -> LinkService {
        LinkService::new(Arc::new(mock), UrlPolicy::default())
    }

    #[tokio::test]
    async fn test_create_random_code_success() {
        let mut mock = MockLinkRepository::new();
        mock.expect_create()
            .withf(|nl| nl.code.len() == 6 && nl.original_url == "https://example.com/x")
            .times(1)
            .returning(|nl| Ok(stored(&nl)));

        let link = service(mock)
            .create_short_link("https://example.com/x", CreateOptions::default())
            .await
            .unwrap();

        assert_eq!(link.original_url, "https://example.com/x");
        assert_eq!(link.click_count, 0);
        assert!(!link.one_time);
    }

    #[tokio::test]
    async fn test_create_retries_on_conflict_then_succeeds() {
        let mut mock = MockLinkRepository::new();
        let mut seq = Sequence::new();

        for _ in 0..3 {
            mock.expect_create()
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Err(AppError::conflict("dupe", serde_json::json!({}))));
        }
        mock.expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|nl| Ok(stored(&nl)));

        let result = service(mock)
            .create_short_link("https://example.com", CreateOptions::default())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_gives_up_after_max_attempts() {
        let mut mock = MockLinkRepository::new();
        mock.expect_create()
            .times(10)
            .returning(|_| Err(AppError::conflict("dupe", serde_json::json!({}))));

        let err = service(mock)
            .create_short_link("https://example.com", CreateOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_create_does_not_retry_store_failures() {
        let mut mock = MockLinkRepository::new();
        mock.expect_create()
            .times(1)
            .returning(|_| Err(AppError::internal("db down", serde_json::json!({}))));

        let err = service(mock)
            .create_short_link("https://example.com", CreateOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_create_with_custom_code() {
        let mut mock = MockLinkRepository::new();
        mock.expect_create()
            .withf(|nl| nl.code == "myCode42")
            .times(1)
            .returning(|nl| Ok(stored(&nl)));

        let link = service(mock)
            .create_short_link(
                "https://example.com",
                CreateOptions {
                    custom_code: Some("  myCode42  ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(link.code, "myCode42");
    }

    #[tokio::test]
    async fn test_create_custom_code_conflict_not_retried() {
        let mut mock = MockLinkRepository::new();
        mock.expect_create()
            .times(1)
            .returning(|_| Err(AppError::conflict("dupe", serde_json::json!({}))));

        let err = service(mock)
            .create_short_link(
                "https://example.com",
                CreateOptions {
                    custom_code: Some("taken123".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_create_invalid_custom_code_skips_store() {
        let mut mock = MockLinkRepository::new();
        mock.expect_create().times(0);

        let err = service(mock)
            .create_short_link(
                "https://example.com",
                CreateOptions {
                    custom_code: Some("ab".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_invalid_url() {
        let mut mock = MockLinkRepository::new();
        mock.expect_create().times(0);

        let err = service(mock)
            .create_short_link("not-a-url", CreateOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_one_time_with_ttl() {
        let mut mock = MockLinkRepository::new();
        mock.expect_create()
            .withf(|nl| nl.one_time && nl.expires_at.is_some())
            .times(1)
            .returning(|nl| Ok(stored(&nl)));

        let before = Utc::now();
        let link = service(mock)
            .create_short_link(
                "https://example.com",
                CreateOptions {
                    ttl_seconds: Some(3600),
                    one_time: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let expires_at = link.expires_at.unwrap();
        assert!(expires_at >= before + Duration::seconds(3600));
        assert!(expires_at <= Utc::now() + Duration::seconds(3600));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_ttl() {
        for ttl in [0, -5, MAX_TTL_SECONDS + 1] {
            let mut mock = MockLinkRepository::new();
            mock.expect_create().times(0);

            let err = service(mock)
                .create_short_link(
                    "https://example.com",
                    CreateOptions {
                        ttl_seconds: Some(ttl),
                        ..Default::default()
                    },
                )
                .await
                .unwrap_err();

            assert!(matches!(err, AppError::Validation { .. }), "ttl {ttl}");
        }
    }

    #[tokio::test]
    async fn test_update_destination_validates_url() {
        let mut mock = MockLinkRepository::new();
        mock.expect_update_destination().times(0);

        let err = service(mock)
            .update_destination("abc123", "javascript:alert(1)")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_get_link_not_found() {
        let mut mock = MockLinkRepository::new();
        mock.expect_find_by_code().returning(|_| Ok(None));

        let err = service(mock).get_link("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[test]
    fn test_short_url_joins_cleanly() {
        let mock = MockLinkRepository::new();
        let svc = service(mock);
        assert_eq!(svc.short_url("https://sho.rt/", "abc123"), "https://sho.rt/abc123");
        assert_eq!(svc.short_url("https://sho.rt", "abc123"), "https://sho.rt/abc123");
    }
}
