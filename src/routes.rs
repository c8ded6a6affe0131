//! Generic request handlers shared by every resource.
//!
//! Each function is an ordinary Axum handler parametrized by the resource
//! type. The `crud_handlers!` macro stamps out concrete, documented wrappers
//! around them for each entity kind.

use crate::core::CRUDResource;
use crate::errors::ApiError;
use crate::filtering::apply_filters;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{Method, StatusCode},
};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use uuid::Uuid;

/// Unwrap a JSON body, turning malformed input into a 400 with a `detail`.
///
/// # Errors
///
/// Returns `BadRequest` carrying the rejection text.
pub fn parse_json<P>(payload: Result<Json<P>, JsonRejection>) -> Result<P, ApiError> {
    payload
        .map(|Json(payload)| payload)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// Unwrap an id path segment. An id that is not a UUID names no record, so it
/// is reported as `NotFound` for the resource.
///
/// # Errors
///
/// Returns `NotFound` when the segment does not parse.
pub fn parse_path<T: CRUDResource>(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id).map_err(|rejection| {
        tracing::debug!(
            resource = T::RESOURCE_NAME_SINGULAR,
            error = %rejection.body_text(),
            "Rejected id path segment"
        );
        ApiError::not_found(T::RESOURCE_NAME_SINGULAR, None)
    })
}

/// List records, narrowed by `?field=value` pairs.
///
/// Parameters naming a filterable field become equality conditions; all other
/// parameters are ignored.
///
/// # Errors
///
/// - `BadRequest` if a filter value does not fit its field's type
/// - `Database` on store failure
pub async fn get_all<T>(
    State(db): State<DatabaseConnection>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<T>>, ApiError>
where
    T: CRUDResource,
{
    let condition = apply_filters::<T>(&params)?;
    let items = T::get_all(&db, condition).await?;
    tracing::debug!(
        resource = T::RESOURCE_NAME_PLURAL,
        filters = params.len(),
        count = items.len(),
        "Listed records"
    );
    Ok(Json(items))
}

/// Fetch one record by its UUID.
///
/// # Errors
///
/// Returns `NotFound` if no record has this id.
pub async fn get_one<T>(
    State(db): State<DatabaseConnection>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<T>, ApiError>
where
    T: CRUDResource,
{
    let id = parse_path::<T>(path)?;
    tracing::debug!(resource = T::RESOURCE_NAME_SINGULAR, id = %id, "Fetching record");
    Ok(Json(T::get_one(&db, id).await?))
}

/// Validate and insert a new record.
///
/// # Returns
/// - `201 Created` with the stored record, identity assigned
///
/// # Errors
/// - `BadRequest` for malformed JSON
/// - `ValidationFailed` with per-field messages; nothing is written
pub async fn create_one<T>(
    State(db): State<DatabaseConnection>,
    payload: Result<Json<T::Payload>, JsonRejection>,
) -> Result<(StatusCode, Json<T>), ApiError>
where
    T: CRUDResource,
{
    let payload = parse_json(payload)?;
    let created = T::create(&db, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace every supplied field of an existing record; required fields must be present.
///
/// # Errors
/// - `NotFound` if no record has this id
/// - `BadRequest` / `ValidationFailed` as for create
pub async fn replace_one<T>(
    State(db): State<DatabaseConnection>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<T::Payload>, JsonRejection>,
) -> Result<Json<T>, ApiError>
where
    T: CRUDResource,
{
    let id = parse_path::<T>(path)?;
    let payload = parse_json(payload)?;
    Ok(Json(T::replace(&db, id, payload).await?))
}

/// Apply only the fields present in the payload; everything else keeps its value.
///
/// # Errors
/// - `NotFound` if no record has this id
/// - `BadRequest` / `ValidationFailed` as for create
pub async fn update_one<T>(
    State(db): State<DatabaseConnection>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<T::Payload>, JsonRejection>,
) -> Result<Json<T>, ApiError>
where
    T: CRUDResource,
{
    let id = parse_path::<T>(path)?;
    let payload = parse_json(payload)?;
    Ok(Json(T::partial_update(&db, id, payload).await?))
}

/// Deletes a single resource by its UUID.
///
/// # Returns
/// - `204 No Content` if the resource was deleted
///
/// # Errors
/// - `NotFound` if no record has this id
/// - `Conflict` if other records still depend on it
pub async fn delete_one<T>(
    State(db): State<DatabaseConnection>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError>
where
    T: CRUDResource,
{
    let id = parse_path::<T>(path)?;
    T::delete(&db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Answers `PUT`, `PATCH` and `DELETE` sent to a collection path.
pub async fn missing_id(method: Method) -> ApiError {
    ApiError::bad_request(format!("PK is required for {method} requests."))
}
