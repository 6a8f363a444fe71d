//! # Selection Snapshot
//!
//! The persisted form of a [`ToothSelection`] and the rule for folding a
//! persisted snapshot back into live state.
//!
//! ## Format
//! ```json
//! {
//!   "maxillarySelectedTeeth": [8, 9],
//!   "mandibularSelectedTeeth": [],
//!   "selectedExtractionType": "Missing teeth",
//!   "extractionTypeTeethSelection": {
//!     "Missing teeth": { "maxillary": [1], "mandibular": [17, 32] }
//!   },
//!   "productExtractions": { "prod-7": { "extractions": [], "has_extraction": true } },
//!   "defaultExtractionTypes": { "prod-7": ["Missing teeth", "Implant"] }
//! }
//! ```
//!
//! Snapshots written by the web client wrap this object as
//! `{ "state": { ... }, "version": 0 }`; both shapes are accepted on read.
//!
//! ## Merge Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for each field:                                                        │
//! │      live field empty?  ── yes ──► take persisted value                 │
//! │             │                                                           │
//! │             no                                                          │
//! │             ▼                                                           │
//! │      keep live value (persisted value ignored)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! State populated during a session is never overwritten by a load.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::selection::ToothSelection;
use crate::types::{Arch, ArchPair, ExtractionType, ProductExtractions, ProductId, Tooth};

/// Serializable snapshot of a [`ToothSelection`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    #[serde(default)]
    pub maxillary_selected_teeth: Vec<Tooth>,
    #[serde(default)]
    pub mandibular_selected_teeth: Vec<Tooth>,
    #[serde(default)]
    pub selected_extraction_type: Option<ExtractionType>,
    #[serde(default)]
    pub extraction_type_teeth_selection: BTreeMap<ExtractionType, ArchPair<Vec<Tooth>>>,
    #[serde(default)]
    pub product_extractions: BTreeMap<ProductId, ProductExtractions>,
    #[serde(default)]
    pub default_extraction_types: BTreeMap<ProductId, Vec<ExtractionType>>,
}

impl SelectionSnapshot {
    /// Encodes the snapshot as JSON.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(|e| CoreError::SnapshotEncoding(e.to_string()))
    }

    /// Decodes a snapshot, rejecting anything that does not match the format.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Ok(serde_json::from_value(unwrap_envelope(value)?)?)
    }

    /// Decodes a snapshot field by field, and map entry by map entry.
    ///
    /// Unknown extraction-type names, malformed fields and malformed map
    /// entries are dropped with a warning instead of failing the whole load.
    /// Only a payload that is not a JSON object is an error.
    pub fn from_json_lenient(json: &str) -> CoreResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(mut fields) = unwrap_envelope(value)? else {
            return Err(CoreError::InvalidSnapshot("expected a JSON object".to_string()));
        };

        let mut snapshot = SelectionSnapshot {
            maxillary_selected_teeth: take_field(&mut fields, "maxillarySelectedTeeth"),
            mandibular_selected_teeth: take_field(&mut fields, "mandibularSelectedTeeth"),
            selected_extraction_type: take_extraction_type(&mut fields, "selectedExtractionType"),
            ..SelectionSnapshot::default()
        };

        const TABLE: &str = "extractionTypeTeethSelection";
        for (name, value) in take_entries(&mut fields, TABLE) {
            let Some(ty) = parse_or_warn(&name) else {
                continue;
            };
            if let Some(teeth) = decode_entry(TABLE, &name, value) {
                snapshot.extraction_type_teeth_selection.insert(ty, teeth);
            }
        }

        const PRODUCTS: &str = "productExtractions";
        for (product_id, value) in take_entries(&mut fields, PRODUCTS) {
            if let Some(data) = decode_entry(PRODUCTS, &product_id, value) {
                snapshot.product_extractions.insert(product_id, data);
            }
        }

        const DEFAULTS: &str = "defaultExtractionTypes";
        for (product_id, value) in take_entries(&mut fields, DEFAULTS) {
            if let Some(names) = decode_entry::<Vec<String>>(DEFAULTS, &product_id, value) {
                let types = names.iter().filter_map(|name| parse_or_warn(name)).collect();
                snapshot.default_extraction_types.insert(product_id, types);
            }
        }

        Ok(snapshot)
    }
}

fn unwrap_envelope(value: Value) -> CoreResult<Value> {
    match value {
        Value::Object(mut fields) if fields.get("state").is_some_and(Value::is_object) => {
            Ok(fields.remove("state").unwrap_or_default())
        }
        Value::Object(_) => Ok(value),
        other => Err(CoreError::InvalidSnapshot(format!(
            "expected a JSON object, found {other}"
        ))),
    }
}

fn take_field<T>(fields: &mut Map<String, Value>, name: &str) -> T
where
    T: Default + DeserializeOwned,
{
    match fields.remove(name) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(field = name, error = %e, "Dropping malformed snapshot field");
            T::default()
        }),
    }
}

fn take_extraction_type(fields: &mut Map<String, Value>, name: &str) -> Option<ExtractionType> {
    match fields.remove(name) {
        None | Some(Value::Null) => None,
        Some(Value::String(label)) => parse_or_warn(&label),
        Some(other) => {
            warn!(field = name, found = %other, "Dropping malformed snapshot field");
            None
        }
    }
}

/// Removes a map-valued field, keeping its entries undecoded.
fn take_entries(fields: &mut Map<String, Value>, name: &str) -> Map<String, Value> {
    match fields.remove(name) {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(entries)) => entries,
        Some(other) => {
            warn!(field = name, found = %other, "Dropping malformed snapshot field");
            Map::new()
        }
    }
}

fn decode_entry<T: DeserializeOwned>(field: &str, key: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!(field = field, key = key, error = %e, "Dropping malformed snapshot entry");
            None
        }
    }
}

fn parse_or_warn(name: &str) -> Option<ExtractionType> {
    match name.parse() {
        Ok(ty) => Some(ty),
        Err(_) => {
            warn!(extraction_type = name, "Dropping unknown extraction type from snapshot");
            None
        }
    }
}

// =============================================================================
// ToothSelection <-> Snapshot
// =============================================================================

impl ToothSelection {
    /// Captures the current state.
    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            maxillary_selected_teeth: self.selected_teeth(Arch::Maxillary),
            mandibular_selected_teeth: self.selected_teeth(Arch::Mandibular),
            selected_extraction_type: self.selected_extraction_type,
            extraction_type_teeth_selection: self
                .extraction_teeth
                .iter()
                .map(|(ty, teeth)| {
                    let per_arch = ArchPair::new(
                        teeth.maxillary.iter().copied().collect(),
                        teeth.mandibular.iter().copied().collect(),
                    );
                    (*ty, per_arch)
                })
                .collect(),
            product_extractions: self.product_extractions.clone(),
            default_extraction_types: self.default_extraction_types.clone(),
        }
    }

    /// Rebuilds a selection from a snapshot exactly as persisted.
    ///
    /// Overlapping category claims in the snapshot are kept; call
    /// [`cleanup_overlapping_teeth`](Self::cleanup_overlapping_teeth) to
    /// resolve them.
    pub fn from_snapshot(snapshot: SelectionSnapshot) -> Self {
        let mut selection = ToothSelection::new();
        selection.merge_persisted(snapshot);
        selection
    }

    /// Folds a persisted snapshot into the live state.
    ///
    /// Each persisted field is applied only when the live field is empty.
    ///
    /// ## Returns
    /// The snapshot field names that were restored.
    pub fn merge_persisted(&mut self, snapshot: SelectionSnapshot) -> Vec<&'static str> {
        let mut restored = Vec::new();

        if self.selected.maxillary.is_empty() && !snapshot.maxillary_selected_teeth.is_empty() {
            self.selected.maxillary = snapshot.maxillary_selected_teeth.into_iter().collect();
            restored.push("maxillarySelectedTeeth");
        }

        if self.selected.mandibular.is_empty() && !snapshot.mandibular_selected_teeth.is_empty() {
            self.selected.mandibular = snapshot.mandibular_selected_teeth.into_iter().collect();
            restored.push("mandibularSelectedTeeth");
        }

        if self.selected_extraction_type.is_none() && snapshot.selected_extraction_type.is_some() {
            self.selected_extraction_type = snapshot.selected_extraction_type;
            restored.push("selectedExtractionType");
        }

        if self.extraction_teeth.is_empty() && !snapshot.extraction_type_teeth_selection.is_empty() {
            self.extraction_teeth = snapshot
                .extraction_type_teeth_selection
                .into_iter()
                .map(|(ty, teeth)| {
                    let per_arch = ArchPair::new(
                        teeth.maxillary.into_iter().collect(),
                        teeth.mandibular.into_iter().collect(),
                    );
                    (ty, per_arch)
                })
                .filter(|(_, teeth)| !teeth.is_empty())
                .collect();
            restored.push("extractionTypeTeethSelection");
        }

        if self.product_extractions.is_empty() && !snapshot.product_extractions.is_empty() {
            self.product_extractions = snapshot.product_extractions;
            restored.push("productExtractions");
        }

        if self.default_extraction_types.is_empty() && !snapshot.default_extraction_types.is_empty()
        {
            self.default_extraction_types = snapshot.default_extraction_types;
            restored.push("defaultExtractionTypes");
        }

        restored
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
