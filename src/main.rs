//! Access Key Service - Main Application Entry Point
//!
//! Issues 48-hour access keys for gated study content. A user generates a key
//! from the `/study_1` page, is sent on to an ad-view flow, and gated content
//! checks the key's status on every access.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx, one key record per owner
//! - **Keys**: random identifiers, stored as SHA-256 hashes
//! - **Format**: HTML page plus JSON API
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. With `DATABASE_URL`: create the connection pool and run migrations.
//!    Without it: keep keys in memory
//! 3. Build HTTP router with routes and middleware
//! 4. Start server on configured port

mod app;
mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;
mod store;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    app::AppState,
    services::AccessKeyService,
    store::{KeyStore, MemoryKeyStore, PgKeyStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    // Fail fast rather than on the first form submission
    config.ad_view_url()?;
    tracing::info!("Configuration loaded");

    let store: Arc<dyn KeyStore> = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = db::create_pool(database_url).await?;
            tracing::info!("Database pool created");

            db::run_migrations(&pool).await?;
            tracing::info!("Database migrations complete");

            Arc::new(PgKeyStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, access keys are kept in memory only");
            Arc::new(MemoryKeyStore::new())
        }
    };

    let keys = AccessKeyService::new(store);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let app = app::build_router(AppState::new(keys, config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
