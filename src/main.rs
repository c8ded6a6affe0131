//! # Car Rental API Server
//!
//! ```bash
//! DATABASE_URL="sqlite://rentals.db?mode=rwc" cargo run
//! ```
//!
//! Docs are served at `/docs` once the server is up.

use car_rental::{app, config::Config, migration::Migrator};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "car_rental=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Car Rental API v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    if config.database.is_in_memory() {
        tracing::warn!("Using an in-memory database; all data is lost on shutdown");
    }

    let db = Database::connect(config.database.connect_options()).await?;
    Migrator::up(&db, None).await?;
    tracing::info!("Database schema is up to date");

    let app = app::router(db);
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Listening on http://{address} (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
