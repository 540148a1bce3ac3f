//! DTOs for link creation and management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::{ListQuery, ShortLink, SortDir, SortKey};

/// Request to create a short link.
///
/// Destination URL semantics (scheme, credentials, private hosts) are
/// enforced by the service; the derive only guards obvious size abuse
/// before any work happens.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, max = 2048, message = "url must be 1-2048 characters"))]
    pub url: String,

    /// Optional caller-chosen code (base62, 4-32 chars).
    #[validate(length(max = 64))]
    pub custom_code: Option<String>,

    /// Optional time-to-live in seconds, capped at 365 days.
    pub ttl_seconds: Option<i64>,

    /// When true, the link can be successfully resolved exactly once.
    #[serde(default)]
    pub one_time: bool,
}

/// Response for a created link.
#[derive(Debug, Serialize)]
pub struct CreateLinkResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
}

/// Request to repoint an existing link at a new destination.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[validate(length(min = 1, max = 2048, message = "url must be 1-2048 characters"))]
    pub url: String,
}

/// Full row detail returned by the detail, update, and list endpoints.
#[derive(Debug, Serialize)]
pub struct LinkDetail {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub click_count: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub one_time: bool,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl From<ShortLink> for LinkDetail {
    fn from(link: ShortLink) -> Self {
        Self {
            short_code: link.code,
            original_url: link.original_url,
            created_at: link.created_at,
            click_count: link.click_count,
            last_clicked_at: link.last_clicked_at,
            expires_at: link.expires_at,
            one_time: link.one_time,
            consumed_at: link.consumed_at,
        }
    }
}

/// Query string accepted by the list endpoint.
#[derive(Debug, Deserialize, Validate)]
pub struct ListLinksParams {
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<i64>,

    /// Case-insensitive substring filter on code or destination.
    #[validate(length(max = 256))]
    pub q: Option<String>,

    #[serde(default)]
    pub clicked_only: bool,

    pub sort: Option<SortKey>,
    pub dir: Option<SortDir>,
}

impl From<ListLinksParams> for ListQuery {
    fn from(p: ListLinksParams) -> Self {
        let defaults = ListQuery::default();
        ListQuery {
            limit: p.limit.unwrap_or(defaults.limit),
            text_query: p.q,
            clicked_only: p.clicked_only,
            sort_key: p.sort.unwrap_or(defaults.sort_key),
            sort_dir: p.dir.unwrap_or(defaults.sort_dir),
        }
    }
}
