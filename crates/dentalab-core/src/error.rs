//! # Error Types
//!
//! Domain-specific error types for dentalab-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  dentalab-core errors (this file)                                      │
//! │  ├── CoreError        - Snapshot and domain failures                   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  dentalab-db errors (separate crate)                                   │
//! │  └── DbError          - Slot storage failures                          │
//! │                                                                         │
//! │  Chart command errors (in app)                                         │
//! │  └── ApiError         - What the tooth chart sees (serialized)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Frontend                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The selection state machine itself never fails. These errors only come
//! from the edges: parsing names sent by callers, validating tooth numbers
//! when strict numbering is on, and decoding persisted snapshots.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A persisted snapshot could not be decoded at all.
    ///
    /// ## When This Occurs
    /// - The slot holds something other than a JSON object
    /// - A field has the wrong shape (e.g. teeth as strings)
    #[error("Invalid selection snapshot: {0}")]
    InvalidSnapshot(String),

    /// Snapshot could not be encoded.
    #[error("Failed to encode selection snapshot: {0}")]
    SnapshotEncoding(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::InvalidSnapshot(err.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::OutOfRange {
            field: "tooth".to_string(),
            min: 1,
            max: 16,
        };
        assert_eq!(err.to_string(), "tooth must be between 1 and 16");

        let err = ValidationError::Required {
            field: "extraction_type".to_string(),
        };
        assert_eq!(err.to_string(), "extraction_type is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "product_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_json_error_becomes_invalid_snapshot() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let core_err: CoreError = json_err.into();
        assert!(matches!(core_err, CoreError::InvalidSnapshot(_)));
    }
}
