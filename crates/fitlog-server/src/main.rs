//! # fitlog-server
//!
//! REST API for the fitlog social fitness tracker.
//!
//! This binary provides:
//! - **Workout logging** with per-type/intensity classification
//! - **Publishing, likes, comments and follow edges** on top of the
//!   workout log
//! - **Statistics** (streaks, weekly counts, per-type and monthly trends)
//!   recomputed from the store on every request
//! - **Ownership-based authorization**: everything is publicly readable,
//!   writes are owner-only

mod accounts;
mod api;
mod config;
mod error;
mod posts;
mod profiles;
mod social;
mod stats;
mod workouts;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fitlog_store::Database;

use crate::api::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,fitlog_server=debug")),
        )
        .init();

    info!("Starting fitlog server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Open the store (runs migrations)
    // -----------------------------------------------------------------------
    let database = match &config.database_path {
        Some(path) => Database::open_at(path)?,
        None => Database::new()?,
    };

    let http_addr = config.http_addr;
    let app_state = AppState {
        db: Arc::new(Mutex::new(database)),
        config: Arc::new(config),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
