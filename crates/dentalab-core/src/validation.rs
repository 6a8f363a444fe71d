//! # Validation Module
//!
//! Input validation for values arriving at the chart commands.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Tooth chart widget                                           │
//! │  └── Only renders glyphs 1-32, so clicks are in range                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Chart command (Rust)                                         │
//! │  ├── Type validation (Arch / ExtractionType deserialization)           │
//! │  └── THIS MODULE: names from the product endpoint, optional ranges     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: ToothSelection                                               │
//! │  └── Accepts any integer, never fails                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use dentalab_core::validation::{parse_extraction_type, validate_tooth};
//! use dentalab_core::{Arch, ExtractionType};
//!
//! assert_eq!(parse_extraction_type("Implant").unwrap(), ExtractionType::Implant);
//! assert!(validate_tooth(Arch::Maxillary, 8).is_ok());
//! assert!(validate_tooth(Arch::Maxillary, 24).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{Arch, ExtractionType, Tooth};
use crate::TEETH_PER_ARCH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Tooth Numbers
// =============================================================================

/// Universal numbering range for an arch, inclusive.
///
/// Maxillary runs 1-16 (upper right third molar to upper left), mandibular
/// runs 17-32 (lower left third molar to lower right).
pub const fn universal_range(arch: Arch) -> (i32, i32) {
    match arch {
        Arch::Maxillary => (1, TEETH_PER_ARCH),
        Arch::Mandibular => (TEETH_PER_ARCH + 1, TEETH_PER_ARCH * 2),
    }
}

/// Validates that a tooth number belongs to the arch under Universal numbering.
///
/// Only enforced when the chart runs with strict tooth numbers.
pub fn validate_tooth(arch: Arch, tooth: impl Into<Tooth>) -> ValidationResult<Tooth> {
    let tooth = tooth.into();
    let (min, max) = universal_range(arch);

    if !(min..=max).contains(&tooth.number()) {
        return Err(ValidationError::OutOfRange {
            field: format!("{arch} tooth"),
            min: min as i64,
            max: max as i64,
        });
    }

    Ok(tooth)
}

/// Validates every tooth in a bulk update, returning them in input order.
pub fn validate_teeth(arch: Arch, teeth: &[i32]) -> ValidationResult<Vec<Tooth>> {
    teeth.iter().map(|&t| validate_tooth(arch, t)).collect()
}

// =============================================================================
// Extraction Types
// =============================================================================

/// Parses an extraction-type name sent by a caller.
///
/// ## Rules
/// - Must not be empty
/// - Must name one of the six known categories (label or snake_case key)
pub fn parse_extraction_type(name: &str) -> ValidationResult<ExtractionType> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "extraction_type".to_string(),
        });
    }

    name.parse()
}

/// Parses a product's default extraction-type list.
///
/// Order is preserved and duplicates are dropped.
pub fn parse_extraction_types<S: AsRef<str>>(names: &[S]) -> ValidationResult<Vec<ExtractionType>> {
    let mut parsed = Vec::with_capacity(names.len());
    for name in names {
        let ty = parse_extraction_type(name.as_ref())?;
        if !parsed.contains(&ty) {
            parsed.push(ty);
        }
    }
    Ok(parsed)
}

// =============================================================================
// Identifiers
// =============================================================================

/// Validates a product identifier.
///
/// ## Rules
/// - Must not be empty
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed identifier.
pub fn validate_product_id(product_id: &str) -> ValidationResult<String> {
    let product_id = product_id.trim();

    if product_id.is_empty() {
        return Err(ValidationError::Required {
            field: "product_id".to_string(),
        });
    }

    if product_id.len() > 100 {
        return Err(ValidationError::OutOfRange {
            field: "product_id length".to_string(),
            min: 1,
            max: 100,
        });
    }

    Ok(product_id.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
