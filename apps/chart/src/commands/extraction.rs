//! # Extraction Category Commands
//!
//! Commands for the per-category tooth sets and overlap reconciliation.
//!
//! ## Bulk Update Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  set_extraction_type_teeth(ty, arch, teeth, mode)                       │
//! │                                                                         │
//! │  exclusive ──────────────► replace ty, strip teeth from other categories│
//! │                                                                         │
//! │  preserve ───────────────► replace ty only                              │
//! │                            (response reports hasOverlaps)               │
//! │                                                                         │
//! │  preserve_then_reconcile ► replace ty only, then                        │
//! │                            cleanup_overlapping_teeth()                  │
//! │                            (response lists every resolved conflict)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Category commands never touch the general selection, except
//! [`assign_tooth`] which moves a tooth out of it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use dentalab_core::{Arch, ExtractionType, Tooth, ToothConflict};

use super::{check_teeth, check_tooth, parse_extraction_type, ChartResponse, ToggleResponse};
use crate::error::ApiError;
use crate::state::SelectionState;

/// How a bulk category update treats the other categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// New teeth leave every other category on the arch.
    #[default]
    Exclusive,

    /// Other categories are left alone, overlaps may remain.
    Preserve,

    /// Other categories are left alone, then overlaps are resolved by
    /// category priority.
    PreserveThenReconcile,
}

impl SelectionMode {
    fn preserves_others(self) -> bool {
        !matches!(self, SelectionMode::Exclusive)
    }
}

/// Result of a bulk category update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionUpdateResponse {
    pub chart: ChartResponse,
    /// True when the arch still holds overlapping category claims.
    pub has_overlaps: bool,
    /// Conflicts resolved by `preserve_then_reconcile`.
    pub resolved: Vec<ToothConflict>,
}

/// Result of an explicit overlap cleanup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub resolved: Vec<ToothConflict>,
    pub chart: ChartResponse,
}

/// Replaces one category's teeth on one arch.
///
/// ## Arguments
/// * `extraction_type` - Display name or snake_case key
/// * `arch` - Arch to update
/// * `teeth` - New set for the category (may be empty)
/// * `mode` - How other categories are treated (default: exclusive)
///
/// ## Returns
/// Updated chart, whether overlaps remain, and any resolved conflicts
pub async fn set_extraction_type_teeth(
    state: &SelectionState,
    extraction_type: String,
    arch: Arch,
    teeth: Vec<i32>,
    mode: Option<SelectionMode>,
) -> Result<ExtractionUpdateResponse, ApiError> {
    let mode = mode.unwrap_or_default();
    debug!(
        extraction_type = %extraction_type,
        arch = %arch,
        count = teeth.len(),
        mode = ?mode,
        "set_extraction_type_teeth command"
    );

    let extraction_type = parse_extraction_type(&extraction_type)?;
    let teeth = check_teeth(state, arch, &teeth)?;

    Ok(state
        .update(|chart| {
            let overlapped =
                chart.set_extraction_type_teeth(extraction_type, arch, teeth, mode.preserves_others());

            let (has_overlaps, resolved) = match mode {
                SelectionMode::PreserveThenReconcile => (false, chart.cleanup_overlapping_teeth()),
                _ => (overlapped, Vec::new()),
            };

            ExtractionUpdateResponse {
                chart: ChartResponse::from(&*chart),
                has_overlaps,
                resolved,
            }
        })
        .await)
}

/// Toggles a tooth within one category.
///
/// ## Behavior
/// - In the category: removed from it
/// - Not in the category: removed from every other category on the arch,
///   then added
///
/// ## Returns
/// Whether the tooth is now in the category, plus the updated chart
pub async fn toggle_extraction_type_tooth(
    state: &SelectionState,
    extraction_type: String,
    arch: Arch,
    tooth: i32,
) -> Result<ToggleResponse, ApiError> {
    debug!(
        extraction_type = %extraction_type,
        arch = %arch,
        tooth = tooth,
        "toggle_extraction_type_tooth command"
    );

    let extraction_type = parse_extraction_type(&extraction_type)?;
    let tooth = check_tooth(state, arch, tooth)?;

    Ok(state
        .update(|chart| {
            let selected = chart.toggle_extraction_type_tooth(extraction_type, arch, tooth);
            ToggleResponse {
                selected,
                chart: ChartResponse::from(&*chart),
            }
        })
        .await)
}

/// Puts a tooth in a category and takes it out of every other place on the
/// arch, the general selection included.
pub async fn assign_tooth(
    state: &SelectionState,
    extraction_type: String,
    arch: Arch,
    tooth: i32,
) -> Result<ChartResponse, ApiError> {
    debug!(extraction_type = %extraction_type, arch = %arch, tooth = tooth, "assign_tooth command");

    let extraction_type = parse_extraction_type(&extraction_type)?;
    let tooth = check_tooth(state, arch, tooth)?;

    Ok(state
        .update(|chart| {
            chart.assign_tooth(extraction_type, arch, tooth);
            ChartResponse::from(&*chart)
        })
        .await)
}

/// Empties one category on one arch.
pub async fn clear_extraction_type_selection(
    state: &SelectionState,
    extraction_type: String,
    arch: Arch,
) -> Result<ChartResponse, ApiError> {
    debug!(extraction_type = %extraction_type, arch = %arch, "clear_extraction_type_selection command");

    let extraction_type = parse_extraction_type(&extraction_type)?;
    Ok(state
        .update(|chart| {
            chart.clear_extraction_type_selection(extraction_type, arch);
            ChartResponse::from(&*chart)
        })
        .await)
}

/// Resolves every tooth claimed by more than one category.
///
/// Each contested tooth stays in its highest-priority category:
/// Teeth in mouth, Missing teeth, Will extract on delivery,
/// Has been extracted, Prepped, Implant. Running it twice changes nothing.
///
/// ## Returns
/// The resolved conflicts and the updated chart
pub async fn cleanup_overlapping_teeth(state: &SelectionState) -> CleanupResponse {
    debug!("cleanup_overlapping_teeth command");

    let response = state
        .update(|chart| {
            let resolved = chart.cleanup_overlapping_teeth();
            CleanupResponse {
                resolved,
                chart: ChartResponse::from(&*chart),
            }
        })
        .await;

    if !response.resolved.is_empty() {
        info!(conflicts = response.resolved.len(), "Overlapping teeth resolved");
    }
    response
}

/// Gets one category's teeth on one arch, ascending.
pub async fn get_extraction_type_teeth(
    state: &SelectionState,
    extraction_type: String,
    arch: Arch,
) -> Result<Vec<Tooth>, ApiError> {
    let extraction_type = parse_extraction_type(&extraction_type)?;
    Ok(state.with_selection(|chart| chart.extraction_type_teeth(extraction_type, arch)))
}

pub async fn is_extraction_type_tooth_selected(
    state: &SelectionState,
    extraction_type: String,
    arch: Arch,
    tooth: i32,
) -> Result<bool, ApiError> {
    let extraction_type = parse_extraction_type(&extraction_type)?;
    Ok(state.with_selection(|chart| {
        chart.is_extraction_type_tooth_selected(extraction_type, arch, tooth)
    }))
}

/// Categories claiming a tooth, highest priority first.
///
/// More than one entry means the tooth is contested.
pub async fn get_extraction_types_for_tooth(
    state: &SelectionState,
    arch: Arch,
    tooth: i32,
) -> Vec<ExtractionType> {
    state.with_selection(|chart| chart.extraction_types_for_tooth(arch, tooth))
}
