//! HTTP server initialization and runtime setup.
//!
//! Handles storage selection, database connections, migrations, and the
//! Axum server lifecycle.

use crate::application::services::{
    LinkService, RateLimitService, RateLimitSettings, ResolverService,
};
use crate::config::Config;
use crate::domain::repositories::{LinkRepository, RateLimitStore};
use crate::infrastructure::persistence::{
    MemoryLinkRepository, MemoryRateLimitStore, PgLinkRepository, PgRateLimitStore,
};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::url_validator::UrlPolicy;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage backend (PostgreSQL pool plus migrations, or in-memory)
/// - Application services
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if the database connection, server bind, or server
/// runtime fails.
pub async fn run(config: Config) -> Result<()> {
    let (links, rate_limits, storage_kind): (
        Arc<dyn LinkRepository>,
        Arc<dyn RateLimitStore>,
        &'static str,
    ) = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
                .idle_timeout(Duration::from_secs(config.db_idle_timeout))
                .max_lifetime(Duration::from_secs(config.db_max_lifetime))
                .connect(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;

            let pool = Arc::new(pool);
            (
                Arc::new(PgLinkRepository::new(pool.clone())) as Arc<dyn LinkRepository>,
                Arc::new(PgRateLimitStore::new(pool)) as Arc<dyn RateLimitStore>,
                "postgres",
            )
        }
        None => {
            tracing::warn!("No database configured; using non-persistent in-memory storage");
            (
                Arc::new(MemoryLinkRepository::new()) as Arc<dyn LinkRepository>,
                Arc::new(MemoryRateLimitStore::new()) as Arc<dyn RateLimitStore>,
                "memory",
            )
        }
    };

    let url_policy = UrlPolicy {
        allow_localhost: config.allow_private_urls,
        allow_private_ip: config.allow_private_urls,
    };

    let settings = RateLimitSettings {
        window_seconds: config.rate_window_seconds,
        create_limit: config.rate_create_limit,
        update_limit: config.rate_update_limit,
        delete_limit: config.rate_delete_limit,
    };

    let state = AppState {
        link_service: Arc::new(LinkService::new(links.clone(), url_policy)),
        resolver: Arc::new(ResolverService::new(links)),
        rate_limiter: Arc::new(RateLimitService::new(rate_limits, settings)),
        behind_proxy: config.behind_proxy,
        public_base_url: config.public_base_url.clone(),
        storage_kind,
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .await?;

    Ok(())
}
