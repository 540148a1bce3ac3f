//! In-process implementation of the link store.
//!
//! Used when no `DATABASE_URL` is configured and by the integration tests.
//! The write lock makes each check-and-mutate a single critical section, so
//! the atomicity contract of the trait holds without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::entities::{ListQuery, NewShortLink, ShortLink, SortDir, SortKey};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Process-local link store backed by a `RwLock<HashMap>`.
///
/// Not durable; rows vanish on restart.
#[derive(Default)]
pub struct MemoryLinkRepository {
    links: RwLock<HashMap<String, ShortLink>>,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_poisoned() -> AppError {
        AppError::internal("Link store lock poisoned", serde_json::json!({}))
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let mut links = self.links.write().map_err(|_| Self::lock_poisoned())?;

        if links.contains_key(&new_link.code) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                serde_json::json!({ "code": new_link.code }),
            ));
        }

        let link = ShortLink {
            code: new_link.code.clone(),
            original_url: new_link.original_url,
            created_at: Utc::now(),
            click_count: 0,
            last_clicked_at: None,
            expires_at: new_link.expires_at,
            one_time: new_link.one_time,
            consumed_at: None,
        };
        links.insert(new_link.code, link.clone());

        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        let links = self.links.read().map_err(|_| Self::lock_poisoned())?;
        Ok(links.get(code).cloned())
    }

    async fn conditional_increment(
        &self,
        code: &str,
        now: DateTime<Utc>,
        mark_consumed: bool,
    ) -> Result<u64, AppError> {
        let mut links = self.links.write().map_err(|_| Self::lock_poisoned())?;

        let Some(link) = links.get_mut(code) else {
            return Ok(0);
        };

        if link.is_expired(now) || (mark_consumed && link.consumed_at.is_some()) {
            return Ok(0);
        }

        link.click_count += 1;
        link.last_clicked_at = Some(now);
        if mark_consumed {
            link.consumed_at = Some(now);
        }

        Ok(1)
    }

    async fn update_destination(&self, code: &str, new_url: &str) -> Result<ShortLink, AppError> {
        let mut links = self.links.write().map_err(|_| Self::lock_poisoned())?;

        let Some(link) = links.get_mut(code) else {
            return Err(AppError::not_found(
                "Short link not found",
                serde_json::json!({ "code": code }),
            ));
        };

        link.original_url = new_url.to_string();
        Ok(link.clone())
    }

    async fn delete(&self, code: &str) -> Result<(), AppError> {
        let mut links = self.links.write().map_err(|_| Self::lock_poisoned())?;

        if links.remove(code).is_none() {
            return Err(AppError::not_found(
                "Short link not found",
                serde_json::json!({ "code": code }),
            ));
        }

        Ok(())
    }

    async fn list(&self, query: ListQuery) -> Result<Vec<ShortLink>, AppError> {
        let links = self.links.read().map_err(|_| Self::lock_poisoned())?;

        let needle = query
            .text_query
            .as_deref()
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let mut rows: Vec<ShortLink> = links
            .values()
            .filter(|l| {
                if query.clicked_only && l.click_count == 0 {
                    return false;
                }
                match &needle {
                    Some(q) => {
                        l.code.to_lowercase().contains(q)
                            || l.original_url.to_lowercase().contains(q)
                    }
                    None => true,
                }
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| compare_links(a, b, query.sort_key, query.sort_dir));
        rows.truncate(query.limit.max(0) as usize);

        Ok(rows)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.links.read().map_err(|_| Self::lock_poisoned())?;
        Ok(())
    }
}

/// Ordering that mirrors the SQL backend: requested key with direction,
/// `last_clicked_at` Nones last regardless of direction, ties broken by
/// `created_at desc`.
fn compare_links(a: &ShortLink, b: &ShortLink, key: SortKey, dir: SortDir) -> Ordering {
    let primary = match key {
        SortKey::CreatedAt => directed(a.created_at.cmp(&b.created_at), dir),
        SortKey::ClickCount => directed(a.click_count.cmp(&b.click_count), dir),
        SortKey::LastClickedAt => match (a.last_clicked_at, b.last_clicked_at) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => directed(x.cmp(&y), dir),
        },
    };

    primary.then_with(|| b.created_at.cmp(&a.created_at))
}

fn directed(ordering: Ordering, dir: SortDir) -> Ordering {
    match dir {
        SortDir::Asc => ordering,
        SortDir::Desc => ordering.reverse(),
    }
}
