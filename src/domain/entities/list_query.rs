//! Query parameters for listing short links.

use serde::Deserialize;

/// Sort column for link listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    CreatedAt,
    ClickCount,
    LastClickedAt,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDir {
    Asc,
    Desc,
}

/// Filter, sort, and limit options for [`list`].
///
/// Ties are always broken by `created_at desc`, and links that were never
/// clicked (`last_clicked_at` is `None`) sort last regardless of direction.
///
/// [`list`]: crate::domain::repositories::LinkRepository::list
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub limit: i64,
    /// Case-insensitive substring match against `code` or `original_url`.
    pub text_query: Option<String>,
    /// When true, only links with `click_count > 0` are returned.
    pub clicked_only: bool,
    pub sort_key: SortKey,
    pub sort_dir: SortDir,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            text_query: None,
            clicked_only: false,
            sort_key: SortKey::CreatedAt,
            sort_dir: SortDir::Desc,
        }
    }
}
