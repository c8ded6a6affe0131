//! Odometer bookkeeping for completed rides.
//!
//! A completed ride with both readings contributes `odometer_end -
//! odometer_start` to its vehicle's odometer. The contribution is booked when
//! a ride is created as `completed` or an update (replace or partial) moves it
//! into `completed`, and re-booked (old delta out, new delta in) when the
//! readings of an already completed ride are edited. Moving a ride out of
//! `completed` leaves the odometer as it is.

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait, IntoActiveModel,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::ride::{self, RidePayload, RideStatus};
use crate::models::vehicle;
use crate::validation::{ValidationErrors, effective};

/// The fields of a ride that decide its mileage contribution. The default is a
/// ride that does not exist yet and has booked nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readings {
    pub status: RideStatus,
    pub odometer_start: Option<i32>,
    pub odometer_end: Option<i32>,
}

impl Readings {
    #[must_use]
    pub fn stored(ride: &ride::Model) -> Self {
        Self {
            status: ride.status,
            odometer_start: ride.odometer_start,
            odometer_end: ride.odometer_end,
        }
    }

    /// The readings the ride will hold once `payload` is applied.
    #[must_use]
    pub fn effective(ride: &ride::Model, payload: &RidePayload) -> Self {
        Self {
            status: effective(&payload.status, Some(ride.status)).unwrap_or(ride.status),
            odometer_start: effective(&payload.odometer_start, ride.odometer_start),
            odometer_end: effective(&payload.odometer_end, ride.odometer_end),
        }
    }

    /// The readings a new ride will hold once `payload` is inserted.
    #[must_use]
    pub fn requested(payload: &RidePayload) -> Self {
        Self {
            status: effective(&payload.status, None).unwrap_or_default(),
            odometer_start: effective(&payload.odometer_start, None),
            odometer_end: effective(&payload.odometer_end, None),
        }
    }

    /// Distance driven, when both readings are known.
    #[must_use]
    pub fn delta(&self) -> Option<i64> {
        match (self.odometer_start, self.odometer_end) {
            (Some(start), Some(end)) => Some(i64::from(end) - i64::from(start)),
            _ => None,
        }
    }
}

/// How far the vehicle odometer has to move for a ride going from `stored` to
/// `effective`. `None` means no write is needed.
#[must_use]
pub fn odometer_adjustment(stored: &Readings, effective: &Readings) -> Option<i64> {
    if effective.status != RideStatus::Completed {
        return None;
    }
    let new_delta = effective.delta()?;
    let adjustment = if stored.status == RideStatus::Completed {
        // A completed ride without both readings never booked anything
        new_delta - stored.delta().unwrap_or(0)
    } else {
        new_delta
    };
    (adjustment != 0).then_some(adjustment)
}

/// Book the mileage of an update of `ride` on its vehicle before the ride
/// itself is written.
///
/// The vehicle is read, adjusted and written here; the ride is written
/// afterwards by the caller. The two writes are not wrapped in a transaction,
/// so overlapping updates of the same ride or vehicle can lose or double
/// count mileage.
///
/// # Errors
///
/// - `NotFound` if the ride's vehicle has disappeared
/// - `ValidationFailed` if the new odometer would leave the valid range
/// - `Database` on store failure
pub async fn apply_ride_completion(
    db: &DatabaseConnection,
    ride: &ride::Model,
    payload: &RidePayload,
) -> Result<(), ApiError> {
    let stored = Readings::stored(ride);
    let effective = Readings::effective(ride, payload);
    let Some(adjustment) = odometer_adjustment(&stored, &effective) else {
        return Ok(());
    };
    tracing::debug!(ride = %ride.id, adjustment, "Ride update moves vehicle mileage");
    book_on_vehicle(db, ride.vehicle_id, adjustment).await
}

/// Book the mileage of a ride that is created already `completed`, before it
/// is inserted.
///
/// # Errors
///
/// As [`apply_ride_completion`].
pub async fn apply_new_ride_completion(
    db: &DatabaseConnection,
    payload: &RidePayload,
) -> Result<(), ApiError> {
    let Some(Some(vehicle_id)) = payload.vehicle else {
        return Ok(());
    };
    let requested = Readings::requested(payload);
    let Some(adjustment) = odometer_adjustment(&Readings::default(), &requested) else {
        return Ok(());
    };
    tracing::debug!(adjustment, "New completed ride moves vehicle mileage");
    book_on_vehicle(db, vehicle_id, adjustment).await
}

async fn book_on_vehicle(
    db: &DatabaseConnection,
    vehicle_id: Uuid,
    adjustment: i64,
) -> Result<(), ApiError> {
    let vehicle = vehicle::Entity::find_by_id(vehicle_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("vehicle", Some(vehicle_id.to_string())))?;

    let previous = vehicle.odometer;
    let odometer = i32::try_from(i64::from(previous) + adjustment)
        .ok()
        .filter(|odometer| *odometer >= 0)
        .ok_or_else(|| {
            let mut errors = ValidationErrors::new();
            errors.add(
                "odometer_end",
                "These readings would put the vehicle odometer out of range.",
            );
            ApiError::validation_failed(errors)
        })?;

    let mut active = vehicle.into_active_model();
    active.odometer = Set(odometer);
    active.update(db).await?;

    tracing::info!(
        vehicle = %vehicle_id,
        previous,
        odometer,
        adjustment,
        "Booked ride mileage on vehicle"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(status: RideStatus, start: Option<i32>, end: Option<i32>) -> Readings {
        Readings {
            status,
            odometer_start: start,
            odometer_end: end,
        }
    }

    #[test]
    fn test_first_completion_books_full_delta() {
        let stored = readings(RideStatus::Active, Some(1000), None);
        let effective = readings(RideStatus::Completed, Some(1000), Some(1200));
        assert_eq!(odometer_adjustment(&stored, &effective), Some(200));
    }

    #[test]
    fn test_correction_swaps_deltas() {
        let stored = readings(RideStatus::Completed, Some(1000), Some(1200));
        let effective = readings(RideStatus::Completed, Some(1000), Some(1300));
        assert_eq!(odometer_adjustment(&stored, &effective), Some(100));

        let lowered = readings(RideStatus::Completed, Some(1000), Some(1150));
        assert_eq!(odometer_adjustment(&stored, &lowered), Some(-50));
    }

    #[test]
    fn test_unchanged_completed_ride_needs_no_write() {
        let stored = readings(RideStatus::Completed, Some(1000), Some(1200));
        assert_eq!(odometer_adjustment(&stored, &stored), None);
    }

    #[test]
    fn test_completed_without_readings_books_later() {
        let stored = readings(RideStatus::Completed, Some(1000), None);
        let effective = readings(RideStatus::Completed, Some(1000), Some(1080));
        assert_eq!(odometer_adjustment(&stored, &effective), Some(80));
    }

    #[test]
    fn test_incomplete_readings_do_nothing() {
        let stored = readings(RideStatus::Pending, None, None);
        let effective = readings(RideStatus::Completed, Some(1000), None);
        assert_eq!(odometer_adjustment(&stored, &effective), None);
    }

    #[test]
    fn test_leaving_completed_is_not_reversed() {
        let stored = readings(RideStatus::Completed, Some(1000), Some(1200));
        let effective = readings(RideStatus::Cancelled, Some(1000), Some(1200));
        assert_eq!(odometer_adjustment(&stored, &effective), None);
    }

    #[test]
    fn test_new_ride_books_only_when_completed() {
        let payload: RidePayload = serde_json::from_value(serde_json::json!({
            "status": "completed",
            "odometer_start": 1000,
            "odometer_end": 1200
        }))
        .unwrap();
        let requested = Readings::requested(&payload);
        assert_eq!(odometer_adjustment(&Readings::default(), &requested), Some(200));

        let pending: RidePayload = serde_json::from_value(serde_json::json!({
            "odometer_start": 1000,
            "odometer_end": 1200
        }))
        .unwrap();
        let requested = Readings::requested(&pending);
        assert_eq!(requested.status, RideStatus::Pending);
        assert_eq!(odometer_adjustment(&Readings::default(), &requested), None);
    }

    #[test]
    fn test_effective_readings_merge_payload() {
        let ride = ride::Model {
            id: uuid::Uuid::new_v4(),
            vehicle_id: uuid::Uuid::new_v4(),
            customer_id: None,
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            odometer_start: Some(1000),
            odometer_end: None,
            status: RideStatus::Active,
        };
        let payload: RidePayload = serde_json::from_value(serde_json::json!({
            "status": "completed",
            "odometer_end": 1200
        }))
        .unwrap();
        let effective = Readings::effective(&ride, &payload);
        assert_eq!(effective, readings(RideStatus::Completed, Some(1000), Some(1200)));
        assert_eq!(effective.delta(), Some(200));
    }
}
