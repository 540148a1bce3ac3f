//! Application services orchestrating the domain layer.

pub mod link_service;
pub mod rate_limit_service;
pub mod resolver_service;

pub use link_service::{CreateOptions, LinkService};
pub use rate_limit_service::{RateLimitService, RateLimitSettings};
pub use resolver_service::ResolverService;
