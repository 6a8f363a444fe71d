//! # dentalab-core: Pure Tooth Selection Logic
//!
//! This crate is the **heart** of the dental lab tooth chart. It owns the
//! per-arch, per-category tooth selection state machine as plain data with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Dentalab Chart Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (tooth chart)                       │   │
//! │  │    Tooth glyph click ──► Category picker ──► Case form          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/chart (commands + state)                │   │
//! │  │    toggle_tooth, set_extraction_type_teeth, cleanup, etc.       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ dentalab-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ selection │  │ snapshot  │  │ validation│  │   │
//! │  │   │   Arch    │  │  Tooth-   │  │ persisted │  │  tooth    │  │   │
//! │  │   │ Extraction│  │ Selection │  │  format   │  │  ranges   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 dentalab-db (durable slot storage)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Arch, Tooth, ExtractionType, etc.)
//! - [`selection`] - The tooth selection state machine
//! - [`snapshot`] - Persisted snapshot format and the load-time merge rule
//! - [`error`] - Domain error types
//! - [`validation`] - Tooth number and category name validation
//!
//! ## Example Usage
//!
//! ```rust
//! use dentalab_core::{Arch, ExtractionType, ToothSelection};
//!
//! let mut chart = ToothSelection::new();
//! chart.toggle_extraction_type_tooth(ExtractionType::MissingTeeth, Arch::Maxillary, 11);
//! assert!(chart.is_extraction_type_tooth_selected(ExtractionType::MissingTeeth, Arch::Maxillary, 11));
//!
//! // A general click on the same tooth moves it out of the category
//! chart.toggle_tooth(Arch::Maxillary, 11);
//! assert!(chart.is_tooth_selected(11, Arch::Maxillary));
//! assert!(!chart.is_extraction_type_tooth_selected(ExtractionType::MissingTeeth, Arch::Maxillary, 11));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod selection;
pub mod snapshot;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use selection::{SelectionSummary, ToothConflict, ToothSelection};
pub use snapshot::SelectionSnapshot;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Durable slot key the selection snapshot is written under.
pub const TEETH_SELECTION_STORAGE_KEY: &str = "teeth-selection-storage";

/// Teeth per arch in Universal numbering.
pub const TEETH_PER_ARCH: i32 = 16;
