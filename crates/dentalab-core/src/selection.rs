//! # Tooth Selection
//!
//! The per-arch, per-category tooth selection state machine behind the
//! case-entry tooth chart.
//!
//! ## State Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ToothSelection                                   │
//! │                                                                         │
//! │  selected (general, unlabeled)                                          │
//! │  ├── maxillary:  {8, 9}                                                 │
//! │  └── mandibular: {}                                                     │
//! │                                                                         │
//! │  extraction_teeth (per category)                                        │
//! │  ├── Missing teeth ──── maxillary: {1}    mandibular: {17, 32}          │
//! │  └── Implant ────────── maxillary: {14}   mandibular: {}                │
//! │                                                                         │
//! │  selected_extraction_type: Some(Implant)   (which category clicks use)  │
//! │                                                                         │
//! │  product_extractions / default_extraction_types   (plain caches)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exclusivity
//! Within one arch a tooth belongs to at most one category, and a general
//! click removes it from every category. The mutators enforce this eagerly:
//!
//! ```text
//! toggle_tooth(arch, t)                     add to general, strip from all categories
//! set_selected_teeth(arch, ts)              replace general, strip ts from all categories
//! toggle_extraction_type_tooth(ty, arch, t) strip from other categories, add to ty
//! set_extraction_type_teeth(.., false)      replace ty, strip ts from other categories
//! set_extraction_type_teeth(.., true)       replace ty only  (may leave overlaps)
//! cleanup_overlapping_teeth()               keep each tooth in its best category
//! ```
//!
//! Category mutators never touch the general set. [`ToothSelection::assign_tooth`]
//! is the path that moves a tooth out of the general set into a category.
//!
//! None of the operations fail. Lookups on categories or products that hold
//! nothing return empty values.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::types::{
    Arch, ArchPair, ArchTeeth, ExtractionType, ProductExtractions, ProductId, Tooth,
};

// =============================================================================
// Reports
// =============================================================================

/// A tooth that was claimed by several categories and has been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ToothConflict {
    pub arch: Arch,
    pub tooth: Tooth,
    /// The highest-priority claimant, which keeps the tooth.
    pub kept: ExtractionType,
    /// Claimants the tooth was removed from, in priority order.
    pub removed: Vec<ExtractionType>,
}

/// Counts for the chart header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSummary {
    pub selected: ArchPair<usize>,
    pub categories: BTreeMap<ExtractionType, ArchPair<usize>>,
    pub selected_extraction_type: Option<ExtractionType>,
    pub has_overlaps: bool,
}

// =============================================================================
// Tooth Selection
// =============================================================================

/// Tooth chart selection state.
///
/// ## Invariants
/// - Per arch, a tooth is in at most one category set, except after
///   `set_extraction_type_teeth(.., preserve_others = true)` and before the
///   next [`cleanup_overlapping_teeth`](Self::cleanup_overlapping_teeth)
/// - Categories with no teeth on either arch are not stored
/// - The two arches never affect each other
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToothSelection {
    pub(crate) selected: ArchTeeth,
    pub(crate) selected_extraction_type: Option<ExtractionType>,
    pub(crate) extraction_teeth: BTreeMap<ExtractionType, ArchTeeth>,
    pub(crate) product_extractions: BTreeMap<ProductId, ProductExtractions>,
    pub(crate) default_extraction_types: BTreeMap<ProductId, Vec<ExtractionType>>,
}

impl ToothSelection {
    /// Creates an empty selection.
    pub fn new() -> Self {
        ToothSelection::default()
    }

    // -------------------------------------------------------------------------
    // General selection
    // -------------------------------------------------------------------------

    /// Replaces the general selection for `arch`.
    ///
    /// Every new tooth is removed from all categories on that arch. The other
    /// arch is untouched.
    pub fn set_selected_teeth<I>(&mut self, arch: Arch, teeth: I)
    where
        I: IntoIterator,
        I::Item: Into<Tooth>,
    {
        let teeth: BTreeSet<Tooth> = teeth.into_iter().map(Into::into).collect();
        self.strip_from_categories(arch, &teeth, None);
        *self.selected.get_mut(arch) = teeth;
    }

    /// Toggles a tooth in the general selection.
    ///
    /// Removing has no side effects. Adding also removes the tooth from every
    /// category on the same arch.
    ///
    /// ## Returns
    /// `true` if the tooth is selected after the call.
    pub fn toggle_tooth(&mut self, arch: Arch, tooth: impl Into<Tooth>) -> bool {
        let tooth = tooth.into();

        if self.selected.get_mut(arch).remove(&tooth) {
            return false;
        }

        self.strip_from_categories(arch, &BTreeSet::from([tooth]), None);
        self.selected.get_mut(arch).insert(tooth);
        true
    }

    /// Empties the general selection for one arch. Categories are untouched.
    pub fn clear_selection(&mut self, arch: Arch) {
        self.selected.get_mut(arch).clear();
    }

    /// Empties both general selections and resets the active extraction type.
    pub fn clear_all_selections(&mut self) {
        for arch in Arch::ALL {
            self.clear_selection(arch);
        }
        self.selected_extraction_type = None;
    }

    // -------------------------------------------------------------------------
    // Active extraction type
    // -------------------------------------------------------------------------

    pub fn set_selected_extraction_type(&mut self, extraction_type: Option<ExtractionType>) {
        self.selected_extraction_type = extraction_type;
    }

    pub fn clear_selected_extraction_type(&mut self) {
        self.selected_extraction_type = None;
    }

    pub fn selected_extraction_type(&self) -> Option<ExtractionType> {
        self.selected_extraction_type
    }

    pub fn is_extraction_type_selected(&self, extraction_type: ExtractionType) -> bool {
        self.selected_extraction_type == Some(extraction_type)
    }

    // -------------------------------------------------------------------------
    // Per-category selection
    // -------------------------------------------------------------------------

    /// Replaces a category's teeth on one arch.
    ///
    /// With `preserve_others = false` the new teeth are removed from every
    /// other category on the same arch. With `preserve_others = true` nothing
    /// else changes and the table may hold the same tooth in two categories
    /// until [`cleanup_overlapping_teeth`](Self::cleanup_overlapping_teeth)
    /// runs. The general selection is never touched.
    ///
    /// ## Returns
    /// `true` if `arch` now holds overlapping category claims.
    pub fn set_extraction_type_teeth<I>(
        &mut self,
        extraction_type: ExtractionType,
        arch: Arch,
        teeth: I,
        preserve_others: bool,
    ) -> bool
    where
        I: IntoIterator,
        I::Item: Into<Tooth>,
    {
        let teeth: BTreeSet<Tooth> = teeth.into_iter().map(Into::into).collect();

        if !preserve_others {
            self.strip_from_categories(arch, &teeth, Some(extraction_type));
        }

        *self
            .extraction_teeth
            .entry(extraction_type)
            .or_default()
            .get_mut(arch) = teeth;
        self.prune_empty_categories();

        self.arch_has_overlaps(arch)
    }

    /// Toggles a tooth within one category.
    ///
    /// If present it is removed from that category only. Otherwise it is
    /// removed from every other category on the arch and added here. The
    /// general selection is never touched.
    ///
    /// ## Returns
    /// `true` if the tooth is in the category after the call.
    pub fn toggle_extraction_type_tooth(
        &mut self,
        extraction_type: ExtractionType,
        arch: Arch,
        tooth: impl Into<Tooth>,
    ) -> bool {
        let tooth = tooth.into();

        if let Some(teeth) = self.extraction_teeth.get_mut(&extraction_type) {
            if teeth.get_mut(arch).remove(&tooth) {
                self.prune_empty_categories();
                return false;
            }
        }

        self.strip_from_categories(arch, &BTreeSet::from([tooth]), Some(extraction_type));
        self.extraction_teeth
            .entry(extraction_type)
            .or_default()
            .get_mut(arch)
            .insert(tooth);
        self.prune_empty_categories();
        true
    }

    /// Puts a tooth in a category and takes it out of every other location
    /// on the arch, including the general selection.
    pub fn assign_tooth(
        &mut self,
        extraction_type: ExtractionType,
        arch: Arch,
        tooth: impl Into<Tooth>,
    ) {
        let tooth = tooth.into();
        self.selected.get_mut(arch).remove(&tooth);
        self.strip_from_categories(arch, &BTreeSet::from([tooth]), Some(extraction_type));
        self.extraction_teeth
            .entry(extraction_type)
            .or_default()
            .get_mut(arch)
            .insert(tooth);
    }

    /// Empties one category on one arch.
    pub fn clear_extraction_type_selection(&mut self, extraction_type: ExtractionType, arch: Arch) {
        if let Some(teeth) = self.extraction_teeth.get_mut(&extraction_type) {
            teeth.get_mut(arch).clear();
        }
        self.prune_empty_categories();
    }

    // -------------------------------------------------------------------------
    // Reconciliation
    // -------------------------------------------------------------------------

    /// Resolves teeth claimed by more than one category on the same arch.
    ///
    /// Each such tooth stays only in the claimant with the highest priority
    /// (see [`ExtractionType::priority`]). Running it again is a no-op.
    ///
    /// ## Example
    /// ```rust
    /// use dentalab_core::{Arch, ExtractionType, Tooth, ToothSelection};
    ///
    /// let mut chart = ToothSelection::new();
    /// chart.set_extraction_type_teeth(ExtractionType::Implant, Arch::Mandibular, [20], false);
    /// chart.set_extraction_type_teeth(ExtractionType::MissingTeeth, Arch::Mandibular, [20], true);
    ///
    /// let conflicts = chart.cleanup_overlapping_teeth();
    /// assert_eq!(conflicts.len(), 1);
    /// assert_eq!(chart.extraction_type_teeth(ExtractionType::MissingTeeth, Arch::Mandibular), vec![Tooth::new(20)]);
    /// assert!(chart.extraction_type_teeth(ExtractionType::Implant, Arch::Mandibular).is_empty());
    /// ```
    pub fn cleanup_overlapping_teeth(&mut self) -> Vec<ToothConflict> {
        let conflicts: Vec<ToothConflict> = self
            .claims()
            .into_iter()
            .filter(|(_, claimants)| claimants.len() > 1)
            .map(|((arch, tooth), claimants)| ToothConflict {
                arch,
                tooth,
                kept: claimants[0],
                removed: claimants[1..].to_vec(),
            })
            .collect();

        for conflict in &conflicts {
            for loser in &conflict.removed {
                if let Some(teeth) = self.extraction_teeth.get_mut(loser) {
                    teeth.get_mut(conflict.arch).remove(&conflict.tooth);
                }
            }
        }
        self.prune_empty_categories();

        if !conflicts.is_empty() {
            debug!(resolved = conflicts.len(), "Resolved overlapping tooth claims");
        }

        conflicts
    }

    /// True when any arch holds a tooth in more than one category.
    pub fn has_overlaps(&self) -> bool {
        Arch::ALL.into_iter().any(|arch| self.arch_has_overlaps(arch))
    }

    /// Teeth currently claimed by more than one category, with the claimants
    /// in priority order.
    pub fn overlapping_teeth(&self) -> Vec<(Arch, Tooth, Vec<ExtractionType>)> {
        self.claims()
            .into_iter()
            .filter(|(_, claimants)| claimants.len() > 1)
            .map(|((arch, tooth), claimants)| (arch, tooth, claimants))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Product caches
    // -------------------------------------------------------------------------

    pub fn set_product_extractions(&mut self, product_id: impl Into<ProductId>, data: ProductExtractions) {
        self.product_extractions.insert(product_id.into(), data);
    }

    pub fn product_extractions(&self, product_id: &str) -> Option<&ProductExtractions> {
        self.product_extractions.get(product_id)
    }

    pub fn clear_product_extractions(&mut self, product_id: &str) {
        self.product_extractions.remove(product_id);
    }

    pub fn set_default_extraction_types(
        &mut self,
        product_id: impl Into<ProductId>,
        extraction_types: Vec<ExtractionType>,
    ) {
        self.default_extraction_types
            .insert(product_id.into(), extraction_types);
    }

    pub fn default_extraction_types(&self, product_id: &str) -> Option<&[ExtractionType]> {
        self.default_extraction_types
            .get(product_id)
            .map(Vec::as_slice)
    }

    pub fn clear_default_extraction_types(&mut self, product_id: &str) {
        self.default_extraction_types.remove(product_id);
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// General selection for an arch, ascending.
    pub fn selected_teeth(&self, arch: Arch) -> Vec<Tooth> {
        self.selected.get(arch).iter().copied().collect()
    }

    /// A category's teeth on an arch, ascending.
    pub fn extraction_type_teeth(&self, extraction_type: ExtractionType, arch: Arch) -> Vec<Tooth> {
        self.extraction_teeth
            .get(&extraction_type)
            .map(|teeth| teeth.get(arch).iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_tooth_selected(&self, tooth: impl Into<Tooth>, arch: Arch) -> bool {
        self.selected.get(arch).contains(&tooth.into())
    }

    pub fn is_extraction_type_tooth_selected(
        &self,
        extraction_type: ExtractionType,
        arch: Arch,
        tooth: impl Into<Tooth>,
    ) -> bool {
        let tooth = tooth.into();
        self.extraction_teeth
            .get(&extraction_type)
            .is_some_and(|teeth| teeth.get(arch).contains(&tooth))
    }

    /// Both general selections concatenated, maxillary first.
    pub fn all_selected_teeth(&self) -> Vec<Tooth> {
        Arch::ALL
            .into_iter()
            .flat_map(|arch| self.selected_teeth(arch))
            .collect()
    }

    /// Categories claiming a tooth on an arch, in priority order.
    pub fn extraction_types_for_tooth(&self, arch: Arch, tooth: impl Into<Tooth>) -> Vec<ExtractionType> {
        let tooth = tooth.into();
        self.extraction_teeth
            .iter()
            .filter(|(_, teeth)| teeth.get(arch).contains(&tooth))
            .map(|(ty, _)| *ty)
            .collect()
    }

    /// True when no tooth is selected anywhere and no type is active.
    ///
    /// Product caches are not considered.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
            && self.extraction_teeth.is_empty()
            && self.selected_extraction_type.is_none()
    }

    pub fn summary(&self) -> SelectionSummary {
        SelectionSummary {
            selected: ArchPair::new(self.selected.maxillary.len(), self.selected.mandibular.len()),
            categories: self
                .extraction_teeth
                .iter()
                .map(|(ty, teeth)| {
                    (*ty, ArchPair::new(teeth.maxillary.len(), teeth.mandibular.len()))
                })
                .collect(),
            selected_extraction_type: self.selected_extraction_type,
            has_overlaps: self.has_overlaps(),
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Removes `teeth` from every category on `arch` except `keep`.
    fn strip_from_categories(
        &mut self,
        arch: Arch,
        teeth: &BTreeSet<Tooth>,
        keep: Option<ExtractionType>,
    ) {
        if teeth.is_empty() {
            return;
        }
        for (ty, category) in self.extraction_teeth.iter_mut() {
            if Some(*ty) == keep {
                continue;
            }
            category.get_mut(arch).retain(|t| !teeth.contains(t));
        }
        self.prune_empty_categories();
    }

    fn prune_empty_categories(&mut self) {
        self.extraction_teeth.retain(|_, teeth| !teeth.is_empty());
    }

    /// Claimants per `(arch, tooth)`. The map iterates categories in priority
    /// order, so each claimant list is sorted best-first.
    fn claims(&self) -> BTreeMap<(Arch, Tooth), Vec<ExtractionType>> {
        let mut claims: BTreeMap<(Arch, Tooth), Vec<ExtractionType>> = BTreeMap::new();
        for (ty, teeth) in &self.extraction_teeth {
            for (arch, set) in teeth.iter() {
                for tooth in set {
                    claims.entry((arch, *tooth)).or_default().push(*ty);
                }
            }
        }
        claims
    }

    fn arch_has_overlaps(&self, arch: Arch) -> bool {
        let mut seen = BTreeSet::new();
        self.extraction_teeth
            .values()
            .flat_map(|teeth| teeth.get(arch).iter())
            .any(|tooth| !seen.insert(*tooth))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExtractionType::*;

    const MAX: Arch = Arch::Maxillary;
    const MAN: Arch = Arch::Mandibular;

    fn teeth(numbers: &[i32]) -> Vec<Tooth> {
        numbers.iter().copied().map(Tooth::from).collect()
    }

    #[test]
    fn test_new_selection_is_empty() {
        let chart = ToothSelection::new();
        assert!(chart.is_empty());
        assert!(chart.selected_teeth(MAX).is_empty());
        assert!(chart.extraction_type_teeth(Implant, MAN).is_empty());
        assert_eq!(chart.selected_extraction_type(), None);
        assert!(chart.all_selected_teeth().is_empty());
    }

    #[test]
    fn test_toggle_tooth_round_trip() {
        let mut chart = ToothSelection::new();
        chart.set_selected_teeth(MAX, [3]);
        let before = chart.selected_teeth(MAX);

        assert!(chart.toggle_tooth(MAX, 8));
        assert!(chart.is_tooth_selected(8, MAX));
        assert!(!chart.toggle_tooth(MAX, 8));

        assert_eq!(chart.selected_teeth(MAX), before);
    }

    #[test]
    fn test_toggle_tooth_strips_categories_on_same_arch_only() {
        let mut chart = ToothSelection::new();
        chart.toggle_extraction_type_tooth(MissingTeeth, MAX, 11);
        chart.toggle_extraction_type_tooth(MissingTeeth, MAN, 11);

        chart.toggle_tooth(MAX, 11);

        assert!(!chart.is_extraction_type_tooth_selected(MissingTeeth, MAX, 11));
        assert!(chart.is_extraction_type_tooth_selected(MissingTeeth, MAN, 11));
    }

    #[test]
    fn test_toggle_tooth_off_leaves_categories_alone() {
        let mut chart = ToothSelection::new();
        chart.toggle_tooth(MAX, 5);
        chart.set_extraction_type_teeth(Prepped, MAX, [5], false);

        chart.toggle_tooth(MAX, 5);

        assert!(!chart.is_tooth_selected(5, MAX));
        assert!(chart.is_extraction_type_tooth_selected(Prepped, MAX, 5));
    }

    #[test]
    fn test_set_selected_teeth_replaces_and_strips() {
        let mut chart = ToothSelection::new();
        chart.set_extraction_type_teeth(Implant, MAX, [2, 3, 4], false);
        chart.set_extraction_type_teeth(Implant, MAN, [3], false);
        chart.set_selected_teeth(MAX, [1, 9]);

        chart.set_selected_teeth(MAX, [3, 4]);

        assert_eq!(chart.selected_teeth(MAX), teeth(&[3, 4]));
        assert_eq!(chart.extraction_type_teeth(Implant, MAX), teeth(&[2]));
        assert_eq!(chart.extraction_type_teeth(Implant, MAN), teeth(&[3]));
    }

    #[test]
    fn test_clear_selection_and_clear_all() {
        let mut chart = ToothSelection::new();
        chart.set_selected_teeth(MAX, [1, 2]);
        chart.set_selected_teeth(MAN, [20]);
        chart.set_extraction_type_teeth(Prepped, MAN, [25], false);
        chart.set_selected_extraction_type(Some(Prepped));

        chart.clear_selection(MAX);
        assert!(chart.selected_teeth(MAX).is_empty());
        assert_eq!(chart.selected_teeth(MAN), teeth(&[20]));

        chart.clear_all_selections();
        assert!(chart.all_selected_teeth().is_empty());
        assert_eq!(chart.selected_extraction_type(), None);
        assert_eq!(chart.extraction_type_teeth(Prepped, MAN), teeth(&[25]));
    }

    #[test]
    fn test_selected_extraction_type_register() {
        let mut chart = ToothSelection::new();
        chart.set_selected_extraction_type(Some(HasBeenExtracted));
        assert!(chart.is_extraction_type_selected(HasBeenExtracted));
        assert!(!chart.is_extraction_type_selected(Implant));
        assert!(chart.extraction_type_teeth(HasBeenExtracted, MAX).is_empty());

        chart.clear_selected_extraction_type();
        assert_eq!(chart.selected_extraction_type(), None);
    }

    #[test]
    fn test_set_extraction_type_teeth_enforces_exclusivity() {
        let mut chart = ToothSelection::new();
        chart.set_extraction_type_teeth(MissingTeeth, MAX, [14, 15], false);
        chart.set_extraction_type_teeth(Implant, MAN, [14], false);
        chart.set_selected_teeth(MAX, [14]);
        // general selection took 14 away from Missing teeth
        assert_eq!(chart.extraction_type_teeth(MissingTeeth, MAX), teeth(&[15]));

        let overlaps = chart.set_extraction_type_teeth(Prepped, MAX, [14, 15], false);

        assert!(!overlaps);
        assert_eq!(chart.extraction_type_teeth(Prepped, MAX), teeth(&[14, 15]));
        assert!(chart.extraction_type_teeth(MissingTeeth, MAX).is_empty());
        // other arch and general selection untouched
        assert_eq!(chart.extraction_type_teeth(Implant, MAN), teeth(&[14]));
        assert_eq!(chart.selected_teeth(MAX), teeth(&[14]));
    }

    #[test]
    fn test_set_extraction_type_teeth_preserve_others_reports_overlap() {
        let mut chart = ToothSelection::new();
        chart.set_extraction_type_teeth(Implant, MAN, [20, 21], false);

        let overlaps = chart.set_extraction_type_teeth(MissingTeeth, MAN, [21], true);

        assert!(overlaps);
        assert!(chart.has_overlaps());
        assert_eq!(chart.extraction_type_teeth(Implant, MAN), teeth(&[20, 21]));
        assert_eq!(
            chart.overlapping_teeth(),
            vec![(MAN, Tooth::new(21), vec![MissingTeeth, Implant])]
        );
    }

    #[test]
    fn test_cleanup_keeps_highest_priority() {
        let mut chart = ToothSelection::new();
        chart.set_extraction_type_teeth(Implant, MAN, [30], false);
        chart.set_extraction_type_teeth(MissingTeeth, MAN, [30], true);

        let conflicts = chart.cleanup_overlapping_teeth();

        assert_eq!(
            conflicts,
            vec![ToothConflict {
                arch: MAN,
                tooth: Tooth::new(30),
                kept: MissingTeeth,
                removed: vec![Implant],
            }]
        );
        assert!(chart.is_extraction_type_tooth_selected(MissingTeeth, MAN, 30));
        assert!(!chart.is_extraction_type_tooth_selected(Implant, MAN, 30));
        assert!(!chart.has_overlaps());
    }

    #[test]
    fn test_cleanup_with_three_claimants_and_both_arches() {
        let mut chart = ToothSelection::new();
        chart.set_extraction_type_teeth(Prepped, MAX, [6, 7], true);
        chart.set_extraction_type_teeth(HasBeenExtracted, MAX, [6], true);
        chart.set_extraction_type_teeth(TeethInMouth, MAX, [6], true);
        chart.set_extraction_type_teeth(Prepped, MAN, [6], true);
        chart.set_extraction_type_teeth(Implant, MAN, [6], true);

        let conflicts = chart.cleanup_overlapping_teeth();

        assert_eq!(conflicts.len(), 2);
        assert_eq!(chart.extraction_types_for_tooth(MAX, 6), vec![TeethInMouth]);
        assert_eq!(chart.extraction_types_for_tooth(MAN, 6), vec![Prepped]);
        assert_eq!(chart.extraction_type_teeth(Prepped, MAX), teeth(&[7]));
        assert!(chart.extraction_type_teeth(HasBeenExtracted, MAX).is_empty());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let mut chart = ToothSelection::new();
        chart.set_extraction_type_teeth(WillExtractOnDelivery, MAX, [1, 2, 3], true);
        chart.set_extraction_type_teeth(MissingTeeth, MAX, [2, 3, 4], true);

        chart.cleanup_overlapping_teeth();
        let once = chart.clone();
        let second = chart.cleanup_overlapping_teeth();

        assert!(second.is_empty());
        assert_eq!(chart, once);
    }

    #[test]
    fn test_toggle_extraction_type_tooth() {
        let mut chart = ToothSelection::new();
        chart.toggle_tooth(MAX, 9);
        chart.set_extraction_type_teeth(Implant, MAX, [9], false);

        assert!(chart.toggle_extraction_type_tooth(Prepped, MAX, 9));
        assert!(!chart.is_extraction_type_tooth_selected(Implant, MAX, 9));
        // general selection is not touched by category toggles
        assert!(chart.is_tooth_selected(9, MAX));

        assert!(!chart.toggle_extraction_type_tooth(Prepped, MAX, 9));
        assert!(chart.extraction_types_for_tooth(MAX, 9).is_empty());
    }

    #[test]
    fn test_assign_tooth_moves_out_of_general_selection() {
        let mut chart = ToothSelection::new();
        chart.toggle_tooth(MAN, 19);
        chart.toggle_extraction_type_tooth(Implant, MAN, 19);
        assert!(chart.is_tooth_selected(19, MAN));

        chart.assign_tooth(HasBeenExtracted, MAN, 19);

        assert!(!chart.is_tooth_selected(19, MAN));
        assert_eq!(chart.extraction_types_for_tooth(MAN, 19), vec![HasBeenExtracted]);
    }

    #[test]
    fn test_clear_extraction_type_selection_is_scoped() {
        let mut chart = ToothSelection::new();
        chart.set_extraction_type_teeth(Prepped, MAX, [4], false);
        chart.set_extraction_type_teeth(Prepped, MAN, [28], false);
        chart.set_extraction_type_teeth(Implant, MAX, [5], false);

        chart.clear_extraction_type_selection(Prepped, MAX);

        assert!(chart.extraction_type_teeth(Prepped, MAX).is_empty());
        assert_eq!(chart.extraction_type_teeth(Prepped, MAN), teeth(&[28]));
        assert_eq!(chart.extraction_type_teeth(Implant, MAX), teeth(&[5]));
    }

    #[test]
    fn test_product_caches_are_isolated() {
        let mut chart = ToothSelection::new();
        let data = ProductExtractions {
            extractions: vec![serde_json::json!({ "id": 1 })],
            has_extraction: Some(true),
            extraction_options: None,
        };
        chart.set_product_extractions("p1", data.clone());
        chart.set_default_extraction_types("p1", vec![MissingTeeth, Implant]);

        assert_eq!(chart.product_extractions("p1"), Some(&data));
        assert!(chart.product_extractions("p2").is_none());
        assert_eq!(
            chart.default_extraction_types("p1"),
            Some(&[MissingTeeth, Implant][..])
        );
        assert!(chart.default_extraction_types("p2").is_none());

        chart.clear_product_extractions("p1");
        chart.clear_default_extraction_types("p1");
        assert!(chart.product_extractions("p1").is_none());
        assert!(chart.default_extraction_types("p1").is_none());
    }

    #[test]
    fn test_product_extractions_last_write_wins() {
        let mut chart = ToothSelection::new();
        chart.set_product_extractions("p1", ProductExtractions::default());
        let newer = ProductExtractions {
            has_extraction: Some(false),
            ..ProductExtractions::default()
        };
        chart.set_product_extractions("p1", newer.clone());
        assert_eq!(chart.product_extractions("p1"), Some(&newer));
    }

    #[test]
    fn test_all_selected_teeth_concatenates_maxillary_first() {
        let mut chart = ToothSelection::new();
        chart.set_selected_teeth(MAN, [24, 18]);
        chart.set_selected_teeth(MAX, [2]);
        assert_eq!(chart.all_selected_teeth(), teeth(&[2, 18, 24]));
    }

    #[test]
    fn test_store_accepts_any_integer() {
        let mut chart = ToothSelection::new();
        chart.toggle_tooth(MAX, -4);
        chart.toggle_tooth(MAX, 1000);
        assert_eq!(chart.selected_teeth(MAX), teeth(&[-4, 1000]));
    }

    #[test]
    fn test_summary_counts() {
        let mut chart = ToothSelection::new();
        chart.set_selected_teeth(MAX, [1, 2]);
        chart.set_extraction_type_teeth(Implant, MAN, [20, 21, 22], false);
        chart.set_extraction_type_teeth(Prepped, MAN, [22], true);
        chart.set_selected_extraction_type(Some(Implant));

        let summary = chart.summary();

        assert_eq!(summary.selected, ArchPair::new(2, 0));
        assert_eq!(summary.categories[&Implant], ArchPair::new(0, 3));
        assert_eq!(summary.categories[&Prepped], ArchPair::new(0, 1));
        assert_eq!(summary.selected_extraction_type, Some(Implant));
        assert!(summary.has_overlaps);
    }

    #[test]
    fn test_end_to_end_category_then_general_click() {
        let mut chart = ToothSelection::new();

        chart.toggle_extraction_type_tooth(MissingTeeth, MAX, 11);
        assert!(chart.is_extraction_type_tooth_selected(MissingTeeth, MAX, 11));

        chart.toggle_tooth(MAX, 11);
        assert!(chart.is_tooth_selected(11, MAX));
        assert!(!chart.is_extraction_type_tooth_selected(MissingTeeth, MAX, 11));
    }

    // -------------------------------------------------------------------------
    // Property tests
    // -------------------------------------------------------------------------

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            ToggleTooth(Arch, i32),
            SetSelected(Arch, Vec<i32>),
            ToggleCategory(ExtractionType, Arch, i32),
            SetCategory(ExtractionType, Arch, Vec<i32>),
            SetCategoryPreserving(ExtractionType, Arch, Vec<i32>),
            ClearCategory(ExtractionType, Arch),
        }

        fn arch() -> impl Strategy<Value = Arch> {
            prop_oneof![Just(Arch::Maxillary), Just(Arch::Mandibular)]
        }

        fn category() -> impl Strategy<Value = ExtractionType> {
            (0..ExtractionType::ALL.len()).prop_map(|i| ExtractionType::ALL[i])
        }

        fn tooth() -> impl Strategy<Value = i32> {
            1..8_i32
        }

        fn exclusive_op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (arch(), tooth()).prop_map(|(a, t)| Op::ToggleTooth(a, t)),
                (arch(), prop::collection::vec(tooth(), 0..4))
                    .prop_map(|(a, ts)| Op::SetSelected(a, ts)),
                (category(), arch(), tooth()).prop_map(|(c, a, t)| Op::ToggleCategory(c, a, t)),
                (category(), arch(), prop::collection::vec(tooth(), 0..4))
                    .prop_map(|(c, a, ts)| Op::SetCategory(c, a, ts)),
                (category(), arch()).prop_map(|(c, a)| Op::ClearCategory(c, a)),
            ]
        }

        fn any_op() -> impl Strategy<Value = Op> {
            prop_oneof![
                4 => exclusive_op(),
                1 => (category(), arch(), prop::collection::vec(tooth(), 0..4))
                    .prop_map(|(c, a, ts)| Op::SetCategoryPreserving(c, a, ts)),
            ]
        }

        fn apply(chart: &mut ToothSelection, op: Op) {
            match op {
                Op::ToggleTooth(a, t) => {
                    chart.toggle_tooth(a, t);
                }
                Op::SetSelected(a, ts) => chart.set_selected_teeth(a, ts),
                Op::ToggleCategory(c, a, t) => {
                    chart.toggle_extraction_type_tooth(c, a, t);
                }
                Op::SetCategory(c, a, ts) => {
                    chart.set_extraction_type_teeth(c, a, ts, false);
                }
                Op::SetCategoryPreserving(c, a, ts) => {
                    chart.set_extraction_type_teeth(c, a, ts, true);
                }
                Op::ClearCategory(c, a) => chart.clear_extraction_type_selection(c, a),
            }
        }

        proptest! {
            #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

            #[test]
            fn exclusive_ops_never_double_assign_a_category(
                ops in prop::collection::vec(exclusive_op(), 0..40)
            ) {
                let mut chart = ToothSelection::new();
                for op in ops {
                    apply(&mut chart, op);
                    prop_assert!(!chart.has_overlaps());
                }
            }

            #[test]
            fn general_adds_leave_tooth_in_no_category(
                ops in prop::collection::vec(any_op(), 0..30),
                a in arch(),
                t in tooth(),
            ) {
                let mut chart = ToothSelection::new();
                for op in ops {
                    apply(&mut chart, op);
                }
                if chart.is_tooth_selected(t, a) {
                    chart.toggle_tooth(a, t);
                }

                prop_assert!(chart.toggle_tooth(a, t));
                prop_assert!(chart.extraction_types_for_tooth(a, t).is_empty());
            }

            #[test]
            fn set_selected_teeth_leaves_new_teeth_in_no_category(
                ops in prop::collection::vec(any_op(), 0..30),
                a in arch(),
                ts in prop::collection::vec(tooth(), 0..4),
            ) {
                let mut chart = ToothSelection::new();
                for op in ops {
                    apply(&mut chart, op);
                }

                chart.set_selected_teeth(a, ts.clone());
                for t in ts {
                    prop_assert!(chart.extraction_types_for_tooth(a, t).is_empty());
                }
            }

            #[test]
            fn cleanup_is_idempotent_and_resolves_everything(
                ops in prop::collection::vec(any_op(), 0..40)
            ) {
                let mut chart = ToothSelection::new();
                for op in ops {
                    apply(&mut chart, op);
                }
                chart.cleanup_overlapping_teeth();
                prop_assert!(!chart.has_overlaps());

                let once = chart.clone();
                let again = chart.cleanup_overlapping_teeth();
                prop_assert!(again.is_empty());
                prop_assert_eq!(chart, once);
            }

            #[test]
            fn cleanup_never_drops_a_claimed_tooth(
                ops in prop::collection::vec(any_op(), 0..40)
            ) {
                let mut chart = ToothSelection::new();
                for op in ops {
                    apply(&mut chart, op);
                }
                let claimed: Vec<_> = Arch::ALL
                    .into_iter()
                    .flat_map(|a| (1..8).map(move |t| (a, t)))
                    .filter(|(a, t)| !chart.extraction_types_for_tooth(*a, *t).is_empty())
                    .collect();

                chart.cleanup_overlapping_teeth();

                for (a, t) in claimed {
                    prop_assert_eq!(chart.extraction_types_for_tooth(a, t).len(), 1);
                }
            }
        }
    }
}
