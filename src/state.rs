use std::sync::Arc;

use crate::application::services::{LinkService, RateLimitService, ResolverService};

/// Shared handler state. Cheap to clone; all services are behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub resolver: Arc<ResolverService>,
    pub rate_limiter: Arc<RateLimitService>,
    /// Trust X-Forwarded-For / X-Real-IP when extracting the caller IP.
    pub behind_proxy: bool,
    /// Fallback origin used to build short URLs when the request carries
    /// no usable Host header.
    pub public_base_url: String,
    pub storage_kind: &'static str,
}
