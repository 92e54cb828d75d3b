//! # Error Types
//!
//! Domain-specific error types for mediroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mediroom-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  mediroom-db errors                                                    │
//! │  └── DbError          - Storage failures                               │
//! │                                                                         │
//! │  mediroom-store errors                                                 │
//! │  └── StoreError       - Wrapper lifecycle + DbError                    │
//! │                                                                         │
//! │  CLI errors                                                            │
//! │  └── ApiError         - What the user sees                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain errors raised before anything reaches storage.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Booking names a doctor that is not in the catalog.
    #[error("Unknown doctor: {0}")]
    UnknownDoctor(String),

    /// Booking asks for a slot the doctor does not offer.
    ///
    /// ## User Workflow
    /// ```text
    /// book --doctor "Dr. Jane Smith" --time "10:30 AM"
    ///      │
    ///      ▼
    /// Dr. Jane Smith offers: 09:00 AM, 11:00 AM
    ///      │
    ///      ▼
    /// SlotUnavailable { doctor: "Dr. Jane Smith", time: "10:30 AM" }
    /// ```
    #[error("{doctor} is not available at {time}")]
    SlotUnavailable { doctor: String, time: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g. an email without '@').
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::SlotUnavailable {
            doctor: "Dr. Jane Smith".to_string(),
            time: "10:30 AM".to_string(),
        };
        assert_eq!(err.to_string(), "Dr. Jane Smith is not available at 10:30 AM");

        let err = ValidationError::required("content");
        assert_eq!(err.to_string(), "content is required");
        assert_eq!(err.field(), "content");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("name").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
