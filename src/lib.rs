//! # car_rental
//!
//! A JSON API over customers, vehicles and rides.
//!
//! Each entity kind implements [`CRUDResource`]; the generic handlers in
//! [`routes`] give it list (with `?field=value` filtering), get, create,
//! replace, partial update and delete. Rides add one rule on top: a partial
//! update that completes a ride books its mileage on the vehicle's odometer
//! (see [`mileage`]). [`availability`] answers whether a vehicle is free over
//! a date range.
//!
//! ```rust,no_run
//! use car_rental::{app, migration::Migrator};
//! use sea_orm::Database;
//! use sea_orm_migration::MigratorTrait;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let db = Database::connect("sqlite::memory:").await?;
//! Migrator::up(&db, None).await?;
//! let app = app::router(db);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod availability;
pub mod config;
pub mod core;
pub mod errors;
pub mod filtering;
pub mod migration;
pub mod mileage;
pub mod models;
pub mod routes;
pub mod validation;

pub use crate::core::{CRUDResource, ResourcePayload};
pub use errors::ApiError;
