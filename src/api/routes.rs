//! API route configuration.

use axum::{
    Router,
    routing::get,
};

use crate::api::handlers::links::{create_link, delete_link, get_link, list_links, update_link};
use crate::state::AppState;

/// Management routes, nested under `/api`.
///
/// # Endpoints
///
/// - `POST   /links`        - Create a short link (random or custom code)
/// - `GET    /links`        - List links with filtering and sorting
/// - `GET    /links/{code}` - Detail for one link
/// - `PATCH  /links/{code}` - Repoint the destination URL
/// - `DELETE /links/{code}` - Permanently delete a link
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links).post(create_link))
        .route(
            "/links/{code}",
            get(get_link).patch(update_link).delete(delete_link),
        )
}
