//! # Storage Commands
//!
//! Snapshot access and explicit reload/reset of the persisted chart.
//!
//! ```text
//! get_snapshot ──────────► live state in persisted format (read only)
//! reload_from_storage ───► live state := persisted state
//! reset_storage ─────────► delete persisted slot, live state := empty
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use dentalab_core::SelectionSnapshot;

use super::ChartResponse;
use crate::state::SelectionState;

/// Result of a reload from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadResponse {
    /// False when nothing was persisted; the live chart is then unchanged.
    pub reloaded: bool,
    /// Snapshot fields that were restored.
    pub restored: Vec<String>,
    pub chart: ChartResponse,
}

/// Gets the live chart in its persisted format.
///
/// Product caches are included.
pub async fn get_snapshot(state: &SelectionState) -> SelectionSnapshot {
    debug!("get_snapshot command");
    state.with_selection(|chart| chart.snapshot())
}

/// Replaces the live chart with the persisted one, discarding unsaved
/// changes.
///
/// ## Returns
/// Whether anything was reloaded, the restored fields and the chart
pub async fn reload_from_storage(state: &SelectionState) -> ReloadResponse {
    debug!("reload_from_storage command");

    let restored = state.reload().await;
    ReloadResponse {
        reloaded: restored.is_some(),
        restored: restored
            .unwrap_or_default()
            .into_iter()
            .map(str::to_string)
            .collect(),
        chart: state.with_selection(|chart| ChartResponse::from(chart)),
    }
}

/// Deletes the persisted chart and empties the live one, caches included.
///
/// ## Returns
/// The now-empty chart
pub async fn reset_storage(state: &SelectionState) -> ChartResponse {
    debug!("reset_storage command");

    let removed = state.reset().await;
    info!(removed = removed, "Selection storage reset");

    state.with_selection(|chart| ChartResponse::from(chart))
}
