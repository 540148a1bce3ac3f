//! Link management endpoints under `/api/links`.
//!
//! Mutating handlers consult the rate limiter before any validation or
//! storage work, keyed by action and caller IP.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use validator::Validate;

use crate::api::dto::{
    CreateLinkRequest, CreateLinkResponse, LinkDetail, ListLinksParams, UpdateLinkRequest,
};
use crate::application::services::CreateOptions;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::{base_url, client_ip};

pub async fn create_link(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<CreateLinkResponse>), AppError> {
    let ip = client_ip(&headers, peer, state.behind_proxy);
    state.rate_limiter.check_create(&ip).await?;

    payload.validate()?;

    let options = CreateOptions {
        custom_code: payload.custom_code,
        ttl_seconds: payload.ttl_seconds,
        one_time: payload.one_time,
    };
    let link = state
        .link_service
        .create_short_link(&payload.url, options)
        .await?;

    let base = base_url(&headers).unwrap_or_else(|| state.public_base_url.clone());
    let short_url = state.link_service.short_url(&base, &link.code);

    tracing::info!(
        event = "link_created",
        code = %link.code,
        ip = %ip,
        one_time = link.one_time,
        "short link created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateLinkResponse {
            short_code: link.code,
            short_url,
            original_url: link.original_url,
        }),
    ))
}

pub async fn list_links(
    State(state): State<AppState>,
    Query(params): Query<ListLinksParams>,
) -> Result<Json<Vec<LinkDetail>>, AppError> {
    params.validate()?;
    let links = state.link_service.list_links(params.into()).await?;
    Ok(Json(links.into_iter().map(LinkDetail::from).collect()))
}

pub async fn get_link(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<LinkDetail>, AppError> {
    let link = state.link_service.get_link(&code).await?;
    Ok(Json(link.into()))
}

pub async fn update_link(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkDetail>, AppError> {
    let ip = client_ip(&headers, peer, state.behind_proxy);
    state.rate_limiter.check_update(&ip).await?;

    payload.validate()?;

    let link = state
        .link_service
        .update_destination(&code, &payload.url)
        .await?;

    tracing::info!(event = "link_updated", code = %code, ip = %ip, "destination updated");
    Ok(Json(link.into()))
}

pub async fn delete_link(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let ip = client_ip(&headers, peer, state.behind_proxy);
    state.rate_limiter.check_delete(&ip).await?;

    state.link_service.delete_link(&code).await?;

    tracing::info!(event = "link_deleted", code = %code, ip = %ip, "short link deleted");
    Ok(StatusCode::NO_CONTENT)
}
