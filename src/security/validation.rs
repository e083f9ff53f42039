//! Request Validation Module
//!
//! Validation for activity records on the write path.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::activity::NewActivity;

/// Maximum length of identifier-like string fields
pub const MAX_FIELD_LENGTH: usize = 256;

/// Validation error types
#[derive(Debug, Error, Clone, Serialize, Deserialize, PartialEq)]
pub enum ValidationError {
    #[error("Required field '{field}' is missing")]
    MissingField { field: String },

    #[error("Field '{field}' is too long (max: {max}, got: {got})")]
    TooLong {
        field: String,
        max: usize,
        got: usize,
    },

    #[error("Field '{field}' must not be negative")]
    Negative { field: String },

    #[error("Field '{field}' must be a finite number")]
    NotFinite { field: String },
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field } => field.as_str(),
            Self::TooLong { field, .. } => field.as_str(),
            Self::Negative { field } => field.as_str(),
            Self::NotFinite { field } => field.as_str(),
        }
    }
}

/// Validation result type
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Request validation trait
pub trait Validatable: Send + Sync {
    /// Validate the request data
    fn validate(&self) -> ValidationResult<()>;
}

/// Validate a required string field
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: field.to_string(),
        });
    }
    let length = value.chars().count();
    if length > MAX_FIELD_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_FIELD_LENGTH,
            got: length,
        });
    }
    Ok(())
}

/// Validate a measurement: finite and non-negative
pub fn validate_measurement(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

impl Validatable for NewActivity {
    fn validate(&self) -> ValidationResult<()> {
        validate_required("user_id", &self.user_id)?;
        validate_required("date", &self.date)?;
        validate_measurement("hydration_liters", self.hydration_liters)?;
        validate_measurement("sleep_hours", self.sleep_hours)?;
        validate_measurement("exercise_minutes", self.exercise_minutes)?;
        validate_measurement("meditation_minutes", self.meditation_minutes)?;
        if let Some(source) = &self.source {
            validate_required("source", source)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> NewActivity {
        NewActivity {
            user_id: "u1".into(),
            date: "2024-01-01".into(),
            hydration_liters: 2.0,
            sleep_hours: 8.0,
            exercise_minutes: 0.0,
            meditation_minutes: 0.0,
            source: None,
        }
    }

    #[test]
    fn test_valid_activity() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_blank_user_id_rejected() {
        let mut activity = valid();
        activity.user_id = "  ".into();
        let err = activity.validate().unwrap_err();
        assert_eq!(err.field(), "user_id");
    }

    #[test]
    fn test_missing_date_rejected() {
        let mut activity = valid();
        activity.date = String::new();
        assert_eq!(
            activity.validate(),
            Err(ValidationError::MissingField {
                field: "date".into()
            })
        );
    }

    #[test]
    fn test_negative_measurement_rejected() {
        let mut activity = valid();
        activity.exercise_minutes = -5.0;
        assert_eq!(
            activity.validate(),
            Err(ValidationError::Negative {
                field: "exercise_minutes".into()
            })
        );
    }

    #[test]
    fn test_nan_measurement_rejected() {
        let mut activity = valid();
        activity.hydration_liters = f64::NAN;
        assert_eq!(activity.validate().unwrap_err().field(), "hydration_liters");
    }

    #[test]
    fn test_empty_source_rejected() {
        let mut activity = valid();
        activity.source = Some(String::new());
        assert_eq!(activity.validate().unwrap_err().field(), "source");
    }

    #[test]
    fn test_overlong_user_id_rejected() {
        let mut activity = valid();
        activity.user_id = "x".repeat(MAX_FIELD_LENGTH + 1);
        assert!(matches!(
            activity.validate(),
            Err(ValidationError::TooLong { .. })
        ));
    }
}
