//! Date-range availability of a vehicle.
//!
//! A vehicle is free over `[start_date, end_date]` when none of its rides
//! overlaps that range, both ends inclusive. Ride status is not consulted:
//! cancelled rides still block their dates.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::ride;

const MISSING_PARAMETERS: &str = "vehicle, start_date, and end_date are required.";
const INVALID_DATE: &str = "Invalid date format. Use YYYY-MM-DD.";

/// Raw query string of an availability check. Everything is optional here so
/// that missing parameters produce our own message rather than a rejection.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    /// Vehicle id
    pub vehicle: Option<String>,
    /// First day of the range, `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// Last day of the range, `YYYY-MM-DD`
    pub end_date: Option<String>,
    /// Ride to leave out, e.g. the ride being edited
    pub excluded_ride: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Availability {
    pub available: bool,
}

/// A parsed availability question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityRequest {
    pub vehicle: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub excluded_ride: Option<Uuid>,
}

impl AvailabilityRequest {
    /// # Errors
    ///
    /// `BadRequest` when `vehicle`, `start_date` or `end_date` is missing, a
    /// date is not `YYYY-MM-DD`, or an id is not a UUID.
    pub fn parse(query: &AvailabilityQuery) -> Result<Self, ApiError> {
        let (Some(vehicle), Some(start_date), Some(end_date)) = (
            present(query.vehicle.as_deref()),
            present(query.start_date.as_deref()),
            present(query.end_date.as_deref()),
        ) else {
            return Err(ApiError::bad_request(MISSING_PARAMETERS));
        };

        let vehicle =
            Uuid::parse_str(vehicle).map_err(|_| ApiError::bad_request("Invalid vehicle id."))?;
        let start_date = parse_date(start_date)?;
        let end_date = parse_date(end_date)?;
        let excluded_ride = present(query.excluded_ride.as_deref())
            .map(|id| {
                Uuid::parse_str(id).map_err(|_| ApiError::bad_request("Invalid excluded_ride id."))
            })
            .transpose()?;

        Ok(Self {
            vehicle,
            start_date,
            end_date,
            excluded_ride,
        })
    }

    /// Whether `ride` blocks this request.
    #[must_use]
    pub fn conflicts_with(&self, ride: &ride::Model) -> bool {
        ride.vehicle_id == self.vehicle
            && self.excluded_ride != Some(ride.id)
            && overlaps(ride.start_date, ride.end_date, self.start_date, self.end_date)
    }
}

/// Inclusive overlap of two date ranges; sharing a single day counts.
#[must_use]
pub fn overlaps(
    ride_start: NaiveDate,
    ride_end: NaiveDate,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> bool {
    ride_start <= end_date && ride_end >= start_date
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ApiError::bad_request(INVALID_DATE))
}

/// Look up the vehicle's rides and test each against the request.
///
/// # Errors
///
/// Returns `Database` on store failure.
pub async fn is_vehicle_available(
    db: &DatabaseConnection,
    request: &AvailabilityRequest,
) -> Result<bool, ApiError> {
    let rides = ride::Entity::find()
        .filter(ride::Column::VehicleId.eq(request.vehicle))
        .all(db)
        .await?;
    let conflicts = rides
        .iter()
        .filter(|ride| request.conflicts_with(ride))
        .count();

    tracing::debug!(
        vehicle = %request.vehicle,
        start_date = %request.start_date,
        end_date = %request.end_date,
        rides = rides.len(),
        conflicts,
        "Checked vehicle availability"
    );
    Ok(conflicts == 0)
}

#[utoipa::path(
    get,
    path = "/availability/",
    tag = "availability",
    params(AvailabilityQuery),
    responses(
        (status = axum::http::StatusCode::OK, description = "Whether the vehicle is free for the whole range", body = Availability),
        (status = axum::http::StatusCode::BAD_REQUEST, description = "Missing parameter, bad date or bad id")
    ),
    summary = "Check vehicle availability",
    description = "A vehicle is unavailable when any of its rides overlaps the range, boundary days included. Cancelled rides count."
)]
pub async fn check_availability_handler(
    State(db): State<DatabaseConnection>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Availability>, ApiError> {
    let request = AvailabilityRequest::parse(&query)?;
    let available = is_vehicle_available(&db, &request).await?;
    Ok(Json(Availability { available }))
}

pub fn router() -> OpenApiRouter<DatabaseConnection> {
    OpenApiRouter::new().routes(routes!(check_availability_handler))
}
