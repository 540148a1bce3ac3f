#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ConnectInfo;
use chrono::{DateTime, Utc};
use linklet::application::services::{
    LinkService, RateLimitService, RateLimitSettings, ResolverService,
};
use linklet::domain::entities::NewShortLink;
use linklet::domain::repositories::LinkRepository;
use linklet::infrastructure::persistence::{MemoryLinkRepository, MemoryRateLimitStore};
use linklet::state::AppState;
use linklet::utils::url_validator::UrlPolicy;
use tower::Layer;

/// Builds handler state over in-memory storage, returning the link
/// repository so tests can seed and inspect rows directly.
pub fn create_test_state() -> (AppState, Arc<MemoryLinkRepository>) {
    create_test_state_with_limits(RateLimitSettings::default())
}

pub fn create_test_state_with_limits(
    settings: RateLimitSettings,
) -> (AppState, Arc<MemoryLinkRepository>) {
    let links = Arc::new(MemoryLinkRepository::new());
    let rate_limits = Arc::new(MemoryRateLimitStore::new());

    let state = AppState {
        link_service: Arc::new(LinkService::new(links.clone(), UrlPolicy::default())),
        resolver: Arc::new(ResolverService::new(links.clone())),
        rate_limiter: Arc::new(RateLimitService::new(rate_limits, settings)),
        behind_proxy: false,
        public_base_url: "http://localhost:3000".to_string(),
        storage_kind: "memory",
    };

    (state, links)
}

pub async fn seed_link(repo: &MemoryLinkRepository, code: &str, url: &str) {
    repo.create(NewShortLink {
        code: code.to_string(),
        original_url: url.to_string(),
        expires_at: None,
        one_time: false,
    })
    .await
    .unwrap();
}

pub async fn seed_expiring_link(
    repo: &MemoryLinkRepository,
    code: &str,
    url: &str,
    expires_at: DateTime<Utc>,
) {
    repo.create(NewShortLink {
        code: code.to_string(),
        original_url: url.to_string(),
        expires_at: Some(expires_at),
        one_time: false,
    })
    .await
    .unwrap();
}

pub async fn seed_one_time_link(repo: &MemoryLinkRepository, code: &str, url: &str) {
    repo.create(NewShortLink {
        code: code.to_string(),
        original_url: url.to_string(),
        expires_at: None,
        one_time: true,
    })
    .await
    .unwrap();
}

/// Injects a fixed peer address so `ConnectInfo<SocketAddr>` extraction
/// works without a real TCP connection.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
