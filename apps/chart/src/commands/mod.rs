//! # Chart Commands Module
//!
//! All commands exposed to the tooth chart frontend.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs         ◄─── You are here (exports, shared responses)
//! ├── selection.rs   ◄─── General selection and the active category
//! ├── extraction.rs  ◄─── Per-category teeth and overlap cleanup
//! ├── product.rs     ◄─── Per-product extraction caches
//! └── storage.rs     ◄─── Snapshot, reload and reset
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Chart Command Flow                                   │
//! │                                                                         │
//! │  Frontend                                                               │
//! │  ────────                                                               │
//! │  toggleTooth({ arch: 'maxillary', tooth: 8 })                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Rust Backend                                                           │
//! │  ────────────                                                           │
//! │  async fn toggle_tooth(                                                 │
//! │      state: &SelectionState,  ◄── Shared chart state                   │
//! │      arch: Arch,              ◄── "maxillary" | "mandibular"           │
//! │      tooth: i32,              ◄── Checked when strict numbering is on  │
//! │  ) -> Result<ToggleResponse, ApiError>                                  │
//! │         │                                                               │
//! │         │ (JSON serialization)                                          │
//! │         ▼                                                               │
//! │  Frontend receives: { selected: true, chart: {...} }                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutating command persists the resulting selection before it
//! returns. Storage failures are logged and never fail the command.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dentalab_core::validation::{validate_teeth, validate_tooth};
use dentalab_core::{Arch, ArchPair, ExtractionType, SelectionSummary, Tooth, ToothSelection};

use crate::error::ApiError;
use crate::state::SelectionState;

pub mod extraction;
pub mod product;
pub mod selection;
pub mod storage;

pub use extraction::*;
pub use product::*;
pub use selection::*;
pub use storage::*;

// =============================================================================
// Shared Responses
// =============================================================================

/// Full chart as the frontend renders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartResponse {
    pub maxillary_selected_teeth: Vec<Tooth>,
    pub mandibular_selected_teeth: Vec<Tooth>,
    pub selected_extraction_type: Option<ExtractionType>,
    pub extraction_type_teeth_selection: BTreeMap<ExtractionType, ArchPair<Vec<Tooth>>>,
    pub summary: SelectionSummary,
}

impl From<&ToothSelection> for ChartResponse {
    fn from(chart: &ToothSelection) -> Self {
        let snapshot = chart.snapshot();
        ChartResponse {
            maxillary_selected_teeth: snapshot.maxillary_selected_teeth,
            mandibular_selected_teeth: snapshot.mandibular_selected_teeth,
            selected_extraction_type: snapshot.selected_extraction_type,
            extraction_type_teeth_selection: snapshot.extraction_type_teeth_selection,
            summary: chart.summary(),
        }
    }
}

/// Result of a single-tooth toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    /// Whether the tooth is in the toggled set after the call.
    pub selected: bool,
    pub chart: ChartResponse,
}

// =============================================================================
// Input Checks
// =============================================================================

/// Converts a raw tooth number, enforcing Universal ranges in strict mode.
pub(crate) fn check_tooth(state: &SelectionState, arch: Arch, tooth: i32) -> Result<Tooth, ApiError> {
    if state.config().strict_tooth_numbers {
        Ok(validate_tooth(arch, tooth)?)
    } else {
        Ok(Tooth::new(tooth))
    }
}

/// Bulk form of [`check_tooth`]; the first out-of-range tooth rejects the
/// whole update.
pub(crate) fn check_teeth(
    state: &SelectionState,
    arch: Arch,
    teeth: &[i32],
) -> Result<Vec<Tooth>, ApiError> {
    if state.config().strict_tooth_numbers {
        Ok(validate_teeth(arch, teeth)?)
    } else {
        Ok(teeth.iter().copied().map(Tooth::new).collect())
    }
}

pub(crate) fn parse_extraction_type(name: &str) -> Result<ExtractionType, ApiError> {
    Ok(dentalab_core::validation::parse_extraction_type(name)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::ChartConfig;

    #[test]
    fn test_lenient_numbers_by_default() {
        let state = SelectionState::default();
        assert_eq!(check_tooth(&state, Arch::Maxillary, 40).unwrap(), Tooth::new(40));
        assert_eq!(
            check_teeth(&state, Arch::Maxillary, &[40, -1]).unwrap(),
            vec![Tooth::new(40), Tooth::new(-1)]
        );
    }

    #[test]
    fn test_strict_numbers() {
        let state = SelectionState::in_memory(ChartConfig {
            strict_tooth_numbers: true,
            ..ChartConfig::default()
        });

        assert!(check_tooth(&state, Arch::Maxillary, 16).is_ok());
        let err = check_tooth(&state, Arch::Maxillary, 17).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(check_teeth(&state, Arch::Mandibular, &[17, 32]).is_ok());
        assert!(check_teeth(&state, Arch::Mandibular, &[17, 5]).is_err());
    }

    #[test]
    fn test_chart_response_shape() {
        let mut chart = ToothSelection::new();
        chart.toggle_tooth(Arch::Maxillary, 3);
        chart.toggle_extraction_type_tooth(ExtractionType::Prepped, Arch::Mandibular, 25);

        let json = serde_json::to_value(ChartResponse::from(&chart)).unwrap();
        assert_eq!(json["maxillarySelectedTeeth"], serde_json::json!([3]));
        assert_eq!(
            json["extractionTypeTeethSelection"]["Prepped"]["mandibular"],
            serde_json::json!([25])
        );
        assert_eq!(json["summary"]["hasOverlaps"], false);
    }
}
