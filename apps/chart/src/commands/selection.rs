//! # Selection Commands
//!
//! Commands for the general tooth selection and the active category.
//!
//! ## Tooth Click Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    General Selection                                    │
//! │                                                                         │
//! │  ┌──────────┐   toggle_tooth   ┌──────────┐   toggle_tooth   ┌───────┐ │
//! │  │ In a     │─────────────────►│ Selected │─────────────────►│ Clear │ │
//! │  │ category │  (leaves every   │          │                  │       │ │
//! │  └──────────┘   category)      └──────────┘                  └───────┘ │
//! │                                      │                                  │
//! │                     clear_selection / clear_all_selections              │
//! │                                      ▼                                  │
//! │                                  (empty arch)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use dentalab_core::{Arch, ExtractionType, Tooth};

use super::{check_teeth, check_tooth, parse_extraction_type, ChartResponse, ToggleResponse};
use crate::error::ApiError;
use crate::state::SelectionState;

/// Gets the whole chart.
///
/// ## Returns
/// General selections, active category, category table and summary counts
pub async fn get_selection(state: &SelectionState) -> ChartResponse {
    debug!("get_selection command");
    state.with_selection(|chart| ChartResponse::from(chart))
}

/// Replaces the general selection of one arch.
///
/// The new teeth leave every category on the same arch.
///
/// ## Arguments
/// * `arch` - Arch to replace
/// * `teeth` - New selection (duplicates collapse)
///
/// ## Returns
/// Updated chart
pub async fn set_selected_teeth(
    state: &SelectionState,
    arch: Arch,
    teeth: Vec<i32>,
) -> Result<ChartResponse, ApiError> {
    debug!(arch = %arch, count = teeth.len(), "set_selected_teeth command");

    let teeth = check_teeth(state, arch, &teeth)?;
    Ok(state
        .update(|chart| {
            chart.set_selected_teeth(arch, teeth);
            ChartResponse::from(&*chart)
        })
        .await)
}

/// Toggles a tooth in the general selection.
///
/// ## Behavior
/// - Selected: removed from the general selection
/// - Not selected: added, and removed from every category on the arch
///
/// ## Returns
/// Whether the tooth is now selected, plus the updated chart
pub async fn toggle_tooth(
    state: &SelectionState,
    arch: Arch,
    tooth: i32,
) -> Result<ToggleResponse, ApiError> {
    debug!(arch = %arch, tooth = tooth, "toggle_tooth command");

    let tooth = check_tooth(state, arch, tooth)?;
    Ok(state
        .update(|chart| {
            let selected = chart.toggle_tooth(arch, tooth);
            ToggleResponse {
                selected,
                chart: ChartResponse::from(&*chart),
            }
        })
        .await)
}

/// Empties the general selection of one arch.
pub async fn clear_selection(state: &SelectionState, arch: Arch) -> ChartResponse {
    debug!(arch = %arch, "clear_selection command");
    state
        .update(|chart| {
            chart.clear_selection(arch);
            ChartResponse::from(&*chart)
        })
        .await
}

/// Empties both general selections and the active type.
///
/// Category sets and product caches survive.
pub async fn clear_all_selections(state: &SelectionState) -> ChartResponse {
    debug!("clear_all_selections command");
    state
        .update(|chart| {
            chart.clear_all_selections();
            ChartResponse::from(&*chart)
        })
        .await
}

/// Sets or clears the active category.
///
/// ## Arguments
/// * `extraction_type` - Display name or snake_case key; `None` clears
pub async fn set_selected_extraction_type(
    state: &SelectionState,
    extraction_type: Option<String>,
) -> Result<ChartResponse, ApiError> {
    debug!(extraction_type = ?extraction_type, "set_selected_extraction_type command");

    let extraction_type = extraction_type
        .as_deref()
        .map(parse_extraction_type)
        .transpose()?;

    Ok(state
        .update(|chart| {
            chart.set_selected_extraction_type(extraction_type);
            ChartResponse::from(&*chart)
        })
        .await)
}

pub async fn clear_selected_extraction_type(state: &SelectionState) -> ChartResponse {
    debug!("clear_selected_extraction_type command");
    state
        .update(|chart| {
            chart.clear_selected_extraction_type();
            ChartResponse::from(&*chart)
        })
        .await
}

pub async fn get_selected_extraction_type(state: &SelectionState) -> Option<ExtractionType> {
    debug!("get_selected_extraction_type command");
    state.with_selection(|chart| chart.selected_extraction_type())
}

pub async fn is_extraction_type_selected(
    state: &SelectionState,
    extraction_type: String,
) -> Result<bool, ApiError> {
    let extraction_type = parse_extraction_type(&extraction_type)?;
    Ok(state.with_selection(|chart| chart.is_extraction_type_selected(extraction_type)))
}

/// Checks membership in the general selection.
pub async fn is_tooth_selected(state: &SelectionState, arch: Arch, tooth: i32) -> bool {
    state.with_selection(|chart| chart.is_tooth_selected(tooth, arch))
}

/// Gets one arch's general selection, ascending.
pub async fn get_selected_teeth(state: &SelectionState, arch: Arch) -> Vec<Tooth> {
    state.with_selection(|chart| chart.selected_teeth(arch))
}

/// Gets both general selections, maxillary first.
pub async fn get_all_selected_teeth(state: &SelectionState) -> Vec<Tooth> {
    state.with_selection(|chart| chart.all_selected_teeth())
}
