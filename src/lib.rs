use std::sync::Arc;

use crate::model::Database;
use crate::utils::signal::shutdown_signal;
use crate::{error::AppResult, web::AppState};
use axum::Router;
use tokio::net::TcpListener;

pub mod config;
pub use config::{Config, ConfigError, ConfigResult};

pub mod auth;
pub mod error;
pub mod model;
pub mod utils;
pub mod web;

static APPLICATION_NAME: &str = "wall";

/// Connects the shared facade and prepares the schema.
///
/// A failed connect is logged and not fatal: the server still starts and every query
/// fails with `NotConnected`. A failing schema script is fatal.
pub async fn bootstrap_database(config: &Config) -> AppResult<Arc<Database>> {
    let db = Arc::new(Database::from_config(config.database()));

    if db.connect().await {
        db.startup_database().await?;
    } else {
        tracing::warn!("starting without a database connection");
    }

    Ok(db)
}

pub fn build_server(db: Arc<Database>, config: Arc<Config>) -> (AppState, Router) {
    let state = AppState::new(db, config);
    let app = web::routes::build_app(state.clone());
    (state, app)
}

#[tracing::instrument]
pub async fn setup_workers() -> AppResult<()> {
    let use_local = cfg!(debug_assertions);
    let config = Config::get_or_init(use_local).await;

    let db = bootstrap_database(config).await?;
    let (_, app) = build_server(Arc::clone(&db), Arc::new(config.clone()));

    let listener = TcpListener::bind(config.host().bindto()).await?;
    tracing::info!("axum is starting at: {}", config.host().bindto());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    Ok(())
}

fn setup_trace() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    // load .env file for RUST_LOG etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .init();

    tracing::debug!("tracing initialized.");
}

#[tracing::instrument]
pub async fn run() -> AppResult<()> {
    setup_trace();
    setup_workers().await?;
    Ok(())
}
