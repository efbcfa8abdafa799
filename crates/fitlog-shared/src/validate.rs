//! Input validation for client-supplied fields.

use serde::Serialize;
use thiserror::Error;

/// Duration bounds for a single workout, in minutes.
pub const MIN_DURATION_MINUTES: i64 = 1;
pub const MAX_DURATION_MINUTES: i64 = 1440;

/// A per-field validation failure.
#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Workout duration must lie in `[1, 1440]` minutes.
pub fn validate_duration(minutes: i64) -> Result<(), ValidationError> {
    if (MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&minutes) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "duration",
            format!("must be between {MIN_DURATION_MINUTES} and {MAX_DURATION_MINUTES} minutes"),
        ))
    }
}

/// A required text field must contain something other than whitespace.
pub fn validate_not_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new(field, "must not be blank"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_bounds() {
        assert!(validate_duration(0).is_err());
        assert!(validate_duration(-5).is_err());
        assert!(validate_duration(1).is_ok());
        assert!(validate_duration(1440).is_ok());
        assert!(validate_duration(1441).is_err());
    }

    #[test]
    fn blank_fields_rejected() {
        assert!(validate_not_blank("title", "   ").is_err());
        assert!(validate_not_blank("title", "Morning Run").is_ok());
        let err = validate_not_blank("username", "").unwrap_err();
        assert_eq!(err.field, "username");
    }
}
