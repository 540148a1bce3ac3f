//! Core business entities.

pub mod list_query;
pub mod short_link;

pub use list_query::{ListQuery, SortDir, SortKey};
pub use short_link::{NewShortLink, ShortLink};
