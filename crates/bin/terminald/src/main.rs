//! # terminald: container terminal daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use terminal_adapter_http_axum::state::AppState;
use terminal_adapter_storage_sqlite_sqlx::{
    SqliteCatalogRepository, SqliteCompanyRepository, SqliteContainerRepository,
    SqliteContainerVisitRepository,
};
use terminal_app::services::catalog_service::CatalogService;
use terminal_app::services::company_service::CompanyService;
use terminal_app::services::container_storage_service::ContainerStorageService;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    // Logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Database
    let db = terminal_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Services
    let storage_service = ContainerStorageService::new(
        SqliteContainerVisitRepository::new(pool.clone()),
        SqliteContainerRepository::new(pool.clone()),
        SqliteCompanyRepository::new(pool.clone()),
        SqliteCatalogRepository::new(pool.clone()),
    );
    let company_service = CompanyService::new(SqliteCompanyRepository::new(pool.clone()));
    let catalog_service = CatalogService::new(
        SqliteCatalogRepository::new(pool.clone()),
        SqliteCompanyRepository::new(pool.clone()),
    );

    // HTTP
    let state = AppState::new(storage_service, company_service, catalog_service);
    let app = terminal_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "terminald listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("shutdown complete");

    Ok(())
}

/// Resolve on the first SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for SIGINT");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutting down");
}
