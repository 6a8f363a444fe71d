//! # Persistence State
//!
//! Loads and saves the selection snapshot under one durable slot key.
//!
//! ## Failure Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load()   slot missing ───────────► None (fresh chart)                  │
//! │           slot unreadable ────────► warn!, None                         │
//! │           storage error ──────────► warn!, None                         │
//! │                                                                         │
//! │  save()   storage error ──────────► warn!, false (chart keeps working)  │
//! │                                                                         │
//! │  disabled ────────────────────────► load = None, save = false           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The chart never fails a user action because storage is unavailable.

use tracing::{debug, warn};
use uuid::Uuid;

use dentalab_core::SelectionSnapshot;
use dentalab_db::{Database, DbError, DbResult, SlotRepository};

/// Reads and decodes the snapshot stored under `key`.
///
/// Decoding is lenient: unknown category names and malformed fields are
/// dropped, but a value that is not a JSON object is an error.
pub async fn load_snapshot(
    slots: &SlotRepository,
    key: &str,
) -> DbResult<Option<SelectionSnapshot>> {
    let Some(stored) = slots.get(key).await? else {
        return Ok(None);
    };

    SelectionSnapshot::from_json_lenient(&stored.value)
        .map(Some)
        .map_err(|e| DbError::invalid_value(key, e))
}

/// Encodes and writes a snapshot under `key`.
pub async fn save_snapshot(
    slots: &SlotRepository,
    key: &str,
    snapshot: &SelectionSnapshot,
    writer_id: Option<&str>,
) -> DbResult<()> {
    let json = snapshot
        .to_json()
        .map_err(|e| DbError::invalid_value(key, e))?;
    slots.put(key, &json, writer_id).await
}

/// Durable storage for one chart session.
#[derive(Debug, Clone)]
pub struct Persistence {
    db: Option<Database>,
    key: String,
    writer_id: String,
}

impl Persistence {
    /// Storage that never reads or writes.
    pub fn disabled(key: impl Into<String>) -> Self {
        Persistence {
            db: None,
            key: key.into(),
            writer_id: Uuid::new_v4().to_string(),
        }
    }

    /// Storage backed by the given database.
    pub fn sqlite(db: Database, key: impl Into<String>) -> Self {
        Persistence {
            db: Some(db),
            key: key.into(),
            writer_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.db.is_some()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Id stamped on every write from this session.
    pub fn writer_id(&self) -> &str {
        &self.writer_id
    }

    /// Loads the persisted snapshot, if any.
    pub async fn load(&self) -> Option<SelectionSnapshot> {
        let db = self.db.as_ref()?;

        match load_snapshot(&db.slots(), &self.key).await {
            Ok(snapshot) => {
                debug!(key = %self.key, found = snapshot.is_some(), "Loaded selection snapshot");
                snapshot
            }
            Err(e) => {
                warn!(key = %self.key, "Ignoring persisted selection: {}", e);
                None
            }
        }
    }

    /// Writes a snapshot.
    ///
    /// ## Returns
    /// `true` if the write reached storage.
    pub async fn save(&self, snapshot: &SelectionSnapshot) -> bool {
        let Some(db) = &self.db else {
            return false;
        };

        match save_snapshot(&db.slots(), &self.key, snapshot, Some(&self.writer_id)).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %self.key, "Failed to persist selection: {}", e);
                false
            }
        }
    }

    /// Deletes the persisted snapshot.
    ///
    /// ## Returns
    /// `true` if a snapshot was removed.
    pub async fn clear(&self) -> bool {
        let Some(db) = &self.db else {
            return false;
        };

        match db.slots().delete(&self.key).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(key = %self.key, "Failed to clear persisted selection: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dentalab_core::{Arch, ExtractionType, ToothSelection};
    use dentalab_db::DbConfig;

    async fn sqlite_persistence() -> Persistence {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Persistence::sqlite(db, "teeth-selection-storage")
    }

    fn sample_snapshot() -> SelectionSnapshot {
        let mut chart = ToothSelection::new();
        chart.toggle_tooth(Arch::Maxillary, 3);
        chart.toggle_extraction_type_tooth(ExtractionType::Implant, Arch::Mandibular, 30);
        chart.snapshot()
    }

    #[tokio::test]
    async fn test_disabled_never_touches_storage() {
        let persistence = Persistence::disabled("teeth-selection-storage");
        assert!(!persistence.is_enabled());
        assert!(!persistence.save(&sample_snapshot()).await);
        assert!(persistence.load().await.is_none());
        assert!(!persistence.clear().await);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let persistence = sqlite_persistence().await;
        let snapshot = sample_snapshot();

        assert!(persistence.load().await.is_none());
        assert!(persistence.save(&snapshot).await);
        assert_eq!(persistence.load().await, Some(snapshot));
    }

    #[tokio::test]
    async fn test_clear() {
        let persistence = sqlite_persistence().await;
        persistence.save(&sample_snapshot()).await;

        assert!(persistence.clear().await);
        assert!(!persistence.clear().await);
        assert!(persistence.load().await.is_none());
    }

    #[tokio::test]
    async fn test_unreadable_slot_loads_as_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.slots().put("teeth-selection-storage", "[1, 2, 3]", None).await.unwrap();

        let err = load_snapshot(&db.slots(), "teeth-selection-storage").await.unwrap_err();
        assert!(matches!(err, DbError::InvalidValue { .. }));

        let persistence = Persistence::sqlite(db, "teeth-selection-storage");
        assert!(persistence.load().await.is_none());
    }

    #[tokio::test]
    async fn test_writer_id_is_stamped() {
        let persistence = sqlite_persistence().await;
        persistence.save(&sample_snapshot()).await;

        let db = persistence.db.as_ref().unwrap();
        let stored = db.slots().get("teeth-selection-storage").await.unwrap().unwrap();
        assert_eq!(stored.writer_id.as_deref(), Some(persistence.writer_id()));
    }

    #[tokio::test]
    async fn test_web_envelope_is_accepted() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.slots()
            .put(
                "teeth-selection-storage",
                r#"{"state":{"maxillarySelectedTeeth":[4]},"version":0}"#,
                None,
            )
            .await
            .unwrap();

        let snapshot = load_snapshot(&db.slots(), "teeth-selection-storage")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.maxillary_selected_teeth, vec![dentalab_core::Tooth::new(4)]);
    }
}
