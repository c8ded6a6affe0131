//! Router assembly and the OpenAPI document.

use axum::{Json, Router, routing::get};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

use crate::availability;
use crate::models::{customer, ride, vehicle};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Car Rental API",
        description = "Customers, vehicles and rides, with odometer tracking and availability checks"
    ),
    tags(
        (name = "customers", description = "People who rent vehicles"),
        (name = "vehicles", description = "The rental fleet"),
        (name = "rides", description = "Rentals; completing a ride books its mileage on the vehicle"),
        (name = "availability", description = "Date-range availability of a vehicle")
    )
)]
pub struct ApiDoc;

/// Every resource route plus the docs UI (`/docs`) and the raw OpenAPI
/// document (`/api-docs/openapi.json`).
pub fn router(db: DatabaseConnection) -> Router {
    let (router, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(customer::router())
        .merge(vehicle::router())
        .merge(ride::router())
        .merge(availability::router())
        .split_for_parts();

    let document = openapi.clone();
    router
        .route(
            "/api-docs/openapi.json",
            get(move || async move { Json(document) }),
        )
        .merge(Scalar::with_url("/docs", openapi))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}
