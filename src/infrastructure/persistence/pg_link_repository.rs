//! PostgreSQL implementation of the link store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder, Row};
use std::sync::Arc;

use crate::domain::entities::{ListQuery, NewShortLink, ShortLink, SortDir, SortKey};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL repository for short links.
///
/// The click-tracking precondition is enforced by a single guarded UPDATE,
/// so the validity check and the counter mutation are atomic without an
/// explicit transaction.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    code: String,
    original_url: String,
    created_at: DateTime<Utc>,
    click_count: i64,
    last_clicked_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    one_time: bool,
    consumed_at: Option<DateTime<Utc>>,
}

impl From<LinkRow> for ShortLink {
    fn from(r: LinkRow) -> Self {
        ShortLink {
            code: r.code,
            original_url: r.original_url,
            created_at: r.created_at,
            click_count: r.click_count,
            last_clicked_at: r.last_clicked_at,
            expires_at: r.expires_at,
            one_time: r.one_time,
            consumed_at: r.consumed_at,
        }
    }
}

const SELECT_COLUMNS: &str = "code, original_url, created_at, click_count, \
                              last_clicked_at, expires_at, one_time, consumed_at";

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let row: LinkRow = sqlx::query_as(&format!(
            "INSERT INTO short_links (code, original_url, expires_at, one_time) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(&new_link.code)
        .bind(&new_link.original_url)
        .bind(new_link.expires_at)
        .bind(new_link.one_time)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        let row: Option<LinkRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM short_links WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn conditional_increment(
        &self,
        code: &str,
        now: DateTime<Utc>,
        mark_consumed: bool,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE short_links \
             SET click_count = click_count + 1, \
                 last_clicked_at = $2, \
                 consumed_at = CASE WHEN $3 THEN $2 ELSE consumed_at END \
             WHERE code = $1 \
               AND (expires_at IS NULL OR expires_at > $2) \
               AND (NOT $3 OR consumed_at IS NULL)",
        )
        .bind(code)
        .bind(now)
        .bind(mark_consumed)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn update_destination(&self, code: &str, new_url: &str) -> Result<ShortLink, AppError> {
        let row: Option<LinkRow> = sqlx::query_as(&format!(
            "UPDATE short_links SET original_url = $2 WHERE code = $1 \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(code)
        .bind(new_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Into::into).ok_or_else(|| {
            AppError::not_found(
                "Short link not found",
                serde_json::json!({ "code": code }),
            )
        })
    }

    async fn delete(&self, code: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM short_links WHERE code = $1")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Short link not found",
                serde_json::json!({ "code": code }),
            ));
        }

        Ok(())
    }

    async fn list(&self, query: ListQuery) -> Result<Vec<ShortLink>, AppError> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {SELECT_COLUMNS} FROM short_links WHERE 1 = 1"
        ));

        if let Some(q) = query.text_query.as_deref().filter(|q| !q.is_empty()) {
            builder
                .push(" AND (code ILIKE '%' || ")
                .push_bind(q.to_string())
                .push(" || '%' OR original_url ILIKE '%' || ")
                .push_bind(q.to_string())
                .push(" || '%')");
        }

        if query.clicked_only {
            builder.push(" AND click_count > 0");
        }

        // ORDER BY is assembled from whitelisted fragments only; user input
        // never reaches it.
        let dir = match query.sort_dir {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        };
        match query.sort_key {
            SortKey::CreatedAt => {
                builder.push(format!(" ORDER BY created_at {dir}"));
            }
            SortKey::ClickCount => {
                builder.push(format!(" ORDER BY click_count {dir}, created_at DESC"));
            }
            SortKey::LastClickedAt => {
                builder.push(format!(
                    " ORDER BY last_clicked_at {dir} NULLS LAST, created_at DESC"
                ));
            }
        }

        builder.push(" LIMIT ").push_bind(query.limit);

        let rows: Vec<LinkRow> = builder
            .build_query_as()
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .fetch_one(self.pool.as_ref())
            .await?
            .try_get::<i32, _>(0)
            .map_err(AppError::from)?;
        Ok(())
    }
}
