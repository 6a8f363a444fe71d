//! # Selection State
//!
//! Manages the live tooth selection and keeps its durable copy current.
//!
//! ## Thread Safety
//! The selection is wrapped in `Arc<Mutex<T>>` because:
//! 1. Every command reads or modifies the same chart
//! 2. Only one command should modify it at a time
//! 3. Commands can run concurrently
//!
//! The selection lock is never held across an `.await`. Writers also take an
//! async writer lock that spans mutate, snapshot and save, so snapshots reach
//! storage in the order they were taken and the stored chart always ends up
//! equal to the live one.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Selection State Operations                           │
//! │                                                                         │
//! │  Frontend Action          Command                   State Change        │
//! │  ───────────────          ───────                   ────────────        │
//! │                                                                         │
//! │  Click tooth ────────────► toggle_tooth() ────────► update(): mutate,  │
//! │                                                     snapshot, save     │
//! │                                                                         │
//! │  Pick category teeth ────► set_extraction_type_ ──► update()           │
//! │                            teeth()                                     │
//! │                                                                         │
//! │  View chart ─────────────► get_selection() ───────► with_selection()   │
//! │                                                     (read only)        │
//! │                                                                         │
//! │  App start ──────────────► bootstrap() ───────────► hydrate(): merge   │
//! │                                                     persisted snapshot │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use dentalab_core::ToothSelection;

use super::config::ChartConfig;
use super::persistence::Persistence;

/// Live selection plus its persistence and configuration.
///
/// Cloning is cheap: clones share the same selection.
#[derive(Debug, Clone)]
pub struct SelectionState {
    selection: Arc<Mutex<ToothSelection>>,
    /// Serializes writers, held across the storage write.
    writes: Arc<tokio::sync::Mutex<()>>,
    persistence: Persistence,
    config: ChartConfig,
}

impl SelectionState {
    /// Creates an empty selection state.
    pub fn new(persistence: Persistence, config: ChartConfig) -> Self {
        SelectionState {
            selection: Arc::new(Mutex::new(ToothSelection::new())),
            writes: Arc::new(tokio::sync::Mutex::new(())),
            persistence,
            config,
        }
    }

    /// Creates a state that never touches storage.
    pub fn in_memory(config: ChartConfig) -> Self {
        let persistence = Persistence::disabled(config.storage_key.clone());
        SelectionState::new(persistence, config)
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    /// Executes a read-only function on the selection.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let summary = state.with_selection(|chart| chart.summary());
    /// ```
    pub fn with_selection<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ToothSelection) -> R,
    {
        let selection = self.lock();
        f(&selection)
    }

    /// Executes a mutation and persists the resulting state.
    ///
    /// A failed write is logged by [`Persistence::save`]; the in-memory
    /// change stands either way.
    pub async fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ToothSelection) -> R,
    {
        let _writer = self.writes.lock().await;
        self.apply_and_save(f).await
    }

    /// Merges the persisted snapshot into the live selection.
    ///
    /// Each persisted field only fills a live field that is still empty.
    /// With `cleanup_on_load` set, overlapping category claims are resolved
    /// afterwards and the cleaned state is written back.
    ///
    /// ## Returns
    /// Names of the snapshot fields that were restored.
    pub async fn hydrate(&self) -> Vec<&'static str> {
        let _writer = self.writes.lock().await;

        let Some(snapshot) = self.persistence.load().await else {
            debug!("No persisted selection to restore");
            return Vec::new();
        };

        let restored = self.lock().merge_persisted(snapshot);
        info!(fields = ?restored, "Restored persisted selection");

        if self.config.cleanup_on_load {
            let resolved = self
                .apply_and_save(|chart| chart.cleanup_overlapping_teeth())
                .await;
            if !resolved.is_empty() {
                info!(conflicts = resolved.len(), "Resolved overlapping teeth on load");
            }
        }

        restored
    }

    /// Replaces the live selection with the persisted one.
    ///
    /// With nothing persisted (or persistence disabled) the live selection
    /// is kept as-is.
    ///
    /// ## Returns
    /// Names of the snapshot fields that were restored, or `None` when
    /// there was nothing to reload.
    pub async fn reload(&self) -> Option<Vec<&'static str>> {
        let _writer = self.writes.lock().await;
        let snapshot = self.persistence.load().await?;

        let restored = {
            let mut selection = self.lock();
            *selection = ToothSelection::new();
            selection.merge_persisted(snapshot)
        };
        info!(fields = ?restored, "Reloaded selection from storage");
        Some(restored)
    }

    /// Deletes the persisted snapshot and empties the live selection.
    ///
    /// ## Returns
    /// `true` if a persisted snapshot was removed.
    pub async fn reset(&self) -> bool {
        let _writer = self.writes.lock().await;
        let removed = self.persistence.clear().await;
        *self.lock() = ToothSelection::new();
        removed
    }

    /// Mutates, snapshots and saves. Callers hold the writer lock.
    async fn apply_and_save<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ToothSelection) -> R,
    {
        let (result, snapshot) = {
            let mut selection = self.lock();
            let result = f(&mut selection);
            (result, selection.snapshot())
        };

        self.persistence.save(&snapshot).await;
        result
    }

    fn lock(&self) -> MutexGuard<'_, ToothSelection> {
        // A panic mid-mutation leaves plain data behind; keep serving it.
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        SelectionState::in_memory(ChartConfig::default())
    }
}
