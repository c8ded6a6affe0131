//! Validation Support
//!
//! Payloads collect field-level problems into [`ValidationErrors`] instead of
//! failing on the first one, so a caller sees every rejected field at once.
//! The collection serializes as a mapping of field name to messages:
//!
//! ```json
//! {"registration": ["vehicle with this registration already exists."]}
//! ```

use serde::{Serialize, Serializer, ser::SerializeMap};
use std::fmt;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const BLANK: &str = "This field may not be blank.";

/// How strictly a payload is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// New record: required fields must be present.
    Create,
    /// Full replacement of an existing record: required fields must be present.
    Replace,
    /// Partial update: only fields present in the payload are checked.
    Partial,
}

impl ValidationMode {
    #[must_use]
    pub const fn is_partial(self) -> bool {
        matches!(self, Self::Partial)
    }
}

/// Validation error with field name and message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Collection of validation errors, in the order they were found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validation error
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError::new(field, message));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Whether any error was recorded against `field`
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    /// Field names in first-seen order, each with its messages
    #[must_use]
    pub fn by_field(&self) -> Vec<(&str, Vec<&str>)> {
        let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();
        for error in &self.errors {
            match grouped.iter_mut().find(|(field, _)| *field == error.field) {
                Some((_, messages)) => messages.push(error.message.as_str()),
                None => grouped.push((error.field.as_str(), vec![error.message.as_str()])),
            }
        }
        grouped
    }

    /// Convert to Result
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was recorded.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let grouped = self.by_field();
        let mut map = serializer.serialize_map(Some(grouped.len()))?;
        for (field, messages) in &grouped {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Resolve a required payload field.
///
/// `None` (absent) is an error unless the mode is partial; `Some(None)` (explicit
/// `null`) is always an error. Returns the value when one was supplied.
pub fn required<'a, T>(
    errors: &mut ValidationErrors,
    mode: ValidationMode,
    field: &str,
    value: &'a Option<Option<T>>,
) -> Option<&'a T> {
    match value {
        Some(Some(value)) => Some(value),
        Some(None) => {
            errors.add(field, NOT_NULL);
            None
        }
        None => {
            if !mode.is_partial() {
                errors.add(field, REQUIRED);
            }
            None
        }
    }
}

/// Resolve a nullable payload field; absent and `null` both yield `None`.
#[must_use]
pub fn optional<T>(value: &Option<Option<T>>) -> Option<&T> {
    value.as_ref().and_then(Option::as_ref)
}

/// Reject an explicit `null` for a field that has a default but is not nullable.
pub fn not_null<T>(errors: &mut ValidationErrors, field: &str, value: &Option<Option<T>>) -> Option<T>
where
    T: Copy,
{
    match value {
        Some(Some(value)) => Some(*value),
        Some(None) => {
            errors.add(field, NOT_NULL);
            None
        }
        None => None,
    }
}

/// The value a field will hold after an update: the payload's when present
/// (including an explicit `null`), otherwise the stored one.
#[must_use]
pub fn effective<T: Copy>(value: &Option<Option<T>>, stored: Option<T>) -> Option<T> {
    match value {
        Some(value) => *value,
        None => stored,
    }
}

/// Helper validators for common patterns
pub mod validators {
    use super::{BLANK, ValidationErrors};

    /// Reject blank strings and strings longer than `max` characters
    pub fn validate_text(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
        if value.trim().is_empty() {
            errors.add(field, BLANK);
        }
        validate_max_length(errors, field, value, max);
    }

    pub fn validate_max_length(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            errors.add(
                field,
                format!("Ensure this field has no more than {max} characters."),
            );
        }
    }

    /// Minimal shape check: one `@`, a non-empty local part, and a dotted domain
    pub fn validate_email(errors: &mut ValidationErrors, field: &str, value: &str) {
        let valid = match value.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !value.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if !valid {
            errors.add(field, "Enter a valid email address.");
        }
    }

    pub fn validate_min(errors: &mut ValidationErrors, field: &str, value: i32, min: i32) {
        if value < min {
            errors.add(
                field,
                format!("Ensure this value is greater than or equal to {min}."),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validators::*;
    use super::*;

    #[test]
    fn test_required_absent_depends_on_mode() {
        let value: Option<Option<String>> = None;
        let mut errors = ValidationErrors::new();
        assert!(required(&mut errors, ValidationMode::Partial, "make", &value).is_none());
        assert!(errors.is_empty());

        assert!(required(&mut errors, ValidationMode::Create, "make", &value).is_none());
        assert!(required(&mut errors, ValidationMode::Replace, "model", &value).is_none());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.errors()[0].message, REQUIRED);
    }

    #[test]
    fn test_required_null_always_rejected() {
        let value: Option<Option<i32>> = Some(None);
        let mut errors = ValidationErrors::new();
        assert!(required(&mut errors, ValidationMode::Partial, "seats", &value).is_none());
        assert_eq!(errors.errors(), &[ValidationError::new("seats", NOT_NULL)]);
    }

    #[test]
    fn test_optional_flattens() {
        assert_eq!(optional(&Some(Some(3))), Some(&3));
        assert_eq!(optional::<i32>(&Some(None)), None);
        assert_eq!(optional::<i32>(&None), None);
    }

    #[test]
    fn test_effective_prefers_payload() {
        assert_eq!(effective(&Some(Some(1300)), Some(1200)), Some(1300));
        assert_eq!(effective(&Some(None), Some(1200)), None);
        assert_eq!(effective(&None, Some(1200)), Some(1200));
        assert_eq!(effective::<i32>(&None, None), None);
    }

    #[test]
    fn test_not_null() {
        let mut errors = ValidationErrors::new();
        assert_eq!(not_null(&mut errors, "available", &Some(Some(false))), Some(false));
        assert_eq!(not_null::<bool>(&mut errors, "available", &None), None);
        assert!(errors.is_empty());
        assert_eq!(not_null::<bool>(&mut errors, "available", &Some(None)), None);
        assert!(errors.has_field("available"));
    }

    #[test]
    fn test_errors_group_by_field() {
        let mut errors = ValidationErrors::new();
        errors.add("make", BLANK);
        errors.add("year", REQUIRED);
        errors.add("make", "Ensure this field has no more than 50 characters.");
        let grouped = errors.by_field();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, "make");
        assert_eq!(grouped[0].1.len(), 2);
        assert!(errors.has_field("year"));
        assert!(!errors.has_field("seats"));
    }

    #[test]
    fn test_validate_text() {
        let mut errors = ValidationErrors::new();
        validate_text(&mut errors, "first_name", "   ", 255);
        validate_text(&mut errors, "make", &"x".repeat(51), 50);
        validate_text(&mut errors, "model", "Corolla", 50);
        assert_eq!(errors.len(), 2);
        assert!(errors.has_field("first_name"));
        assert!(errors.has_field("make"));
    }

    #[test]
    fn test_validate_email() {
        let mut errors = ValidationErrors::new();
        validate_email(&mut errors, "email", "ada@example.com");
        assert!(errors.is_empty());
        for bad in ["ada", "@example.com", "ada@example", "ada@@example.com", "a da@example.com"] {
            let mut errors = ValidationErrors::new();
            validate_email(&mut errors, "email", bad);
            assert!(errors.has_field("email"), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_validate_min() {
        let mut errors = ValidationErrors::new();
        validate_min(&mut errors, "seats", 0, 1);
        validate_min(&mut errors, "odometer", 0, 0);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.errors()[0].message,
            "Ensure this value is greater than or equal to 1."
        );
    }
}
