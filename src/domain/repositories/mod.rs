//! Repository traits decoupling business logic from storage backends.

pub mod link_repository;
pub mod rate_limit_store;

pub use link_repository::LinkRepository;
pub use rate_limit_store::{RateLimitDecision, RateLimitStore};

#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use rate_limit_store::MockRateLimitStore;
