//! Public redirect endpoint.
//!
//! `GET /{code}` resolves a short code and issues a temporary redirect.
//! Every resolution emits exactly one structured event carrying the
//! outcome, the caller's IP, and the code.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;

use crate::domain::resolve::ResolveOutcome;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

pub async fn redirect(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let ip = client_ip(&headers, peer, state.behind_proxy);
    let outcome = state.resolver.resolve_and_track(&code).await?;

    match outcome {
        ResolveOutcome::Success { original_url } => {
            tracing::info!(event = "redirect_ok", code = %code, ip = %ip, "redirecting");
            Ok(Redirect::temporary(&original_url).into_response())
        }
        ResolveOutcome::NotFound => {
            tracing::info!(event = "redirect_not_found", code = %code, ip = %ip, "unknown code");
            Ok((
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Short link not found" })),
            )
                .into_response())
        }
        ResolveOutcome::Expired | ResolveOutcome::Consumed => {
            tracing::info!(
                event = "redirect_gone",
                code = %code,
                ip = %ip,
                reason = outcome.reason(),
                "link no longer available"
            );
            Ok((
                StatusCode::GONE,
                Json(json!({ "error": "Short link is no longer available" })),
            )
                .into_response())
        }
    }
}
