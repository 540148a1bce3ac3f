//! Storage backend implementations of the repository traits.
//!
//! PostgreSQL backends are durable and serve production deployments; the
//! in-memory backends serve development without a database and the test
//! suite.

pub mod memory_link_repository;
pub mod memory_rate_limit_store;
pub mod pg_link_repository;
pub mod pg_rate_limit_store;

pub use memory_link_repository::MemoryLinkRepository;
pub use memory_rate_limit_store::MemoryRateLimitStore;
pub use pg_link_repository::PgLinkRepository;
pub use pg_rate_limit_store::PgRateLimitStore;
