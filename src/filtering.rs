//! # Query Parameter Filtering
//!
//! Listing endpoints accept arbitrary `?field=value` pairs. A pair narrows the
//! result only when `field` is on the resource's allow-list
//! ([`CRUDResource::filterable_columns`]); anything else is silently ignored.
//!
//! The raw string is coerced to the column's type before the equality test:
//!
//! ```text
//! GET /vehicles/?fuel=diesel&available=true&year=2020
//! GET /rides/?vehicle=550e8400-e29b-41d4-a716-446655440000&status=completed
//! GET /rides/?start_date=2024-01-10
//! GET /customers/?created=2024-01-10T09:30:00Z
//! ```
//!
//! A resource may first rewrite a value into its stored form, e.g. an input
//! alias of an enum ([`CRUDResource::canonical_filter_value`]).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sea_orm::{ColumnTrait, ColumnType, Condition, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::CRUDResource;
use crate::errors::ApiError;

// Basic safety limit
const MAX_FIELD_VALUE_LENGTH: usize = 10_000;

/// Build an AND of equality conditions from query parameters.
///
/// # Errors
///
/// Returns `BadRequest` when a value for a known field cannot be coerced to
/// that field's type (e.g. `year=abc`).
pub fn apply_filters<T: CRUDResource>(params: &HashMap<String, String>) -> Result<Condition, ApiError> {
    let columns = T::filterable_columns();
    let mut condition = Condition::all();

    for (key, raw_value) in params {
        let Some((_, column)) = columns.iter().find(|(name, _)| *name == key.as_str()) else {
            continue;
        };
        let raw_value = T::canonical_filter_value(key, raw_value);
        let value = coerce_value(key, &raw_value, column)?;
        condition = condition.add(column.eq(value));
    }

    Ok(condition)
}

/// Parse `raw` into the value type stored in `column`.
///
/// # Errors
///
/// Returns `BadRequest` naming `field` if the string does not parse.
pub fn coerce_value<C: ColumnTrait>(field: &str, raw: &str, column: &C) -> Result<Value, ApiError> {
    if raw.len() > MAX_FIELD_VALUE_LENGTH {
        return Err(invalid(field, raw));
    }
    let trimmed = raw.trim();

    let value = match column.def().get_column_type() {
        ColumnType::TinyInteger | ColumnType::SmallInteger | ColumnType::Integer => trimmed
            .parse::<i32>()
            .map(Value::from)
            .map_err(|_| invalid(field, raw))?,
        ColumnType::BigInteger => trimmed
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid(field, raw))?,
        ColumnType::Float | ColumnType::Double => trimmed
            .parse::<f64>()
            .map(Value::from)
            .map_err(|_| invalid(field, raw))?,
        ColumnType::Boolean => parse_bool(trimmed)
            .map(Value::from)
            .ok_or_else(|| invalid(field, raw))?,
        ColumnType::Uuid => Uuid::parse_str(trimmed)
            .map(Value::from)
            .map_err(|_| invalid(field, raw))?,
        ColumnType::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(Value::from)
            .map_err(|_| invalid(field, raw))?,
        ColumnType::TimestampWithTimeZone => DateTime::parse_from_rfc3339(trimmed)
            .map(|timestamp| Value::from(timestamp.with_timezone(&Utc)))
            .map_err(|_| invalid(field, raw))?,
        ColumnType::DateTime | ColumnType::Timestamp => trimmed
            .parse::<NaiveDateTime>()
            .map(Value::from)
            .map_err(|_| invalid(field, raw))?,
        // Text and string-backed enums compare verbatim
        _ => Value::from(raw.to_owned()),
    };
    Ok(value)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}

fn invalid(field: &str, raw: &str) -> ApiError {
    ApiError::bad_request(format!("Invalid value '{raw}' for filter '{field}'."))
}
