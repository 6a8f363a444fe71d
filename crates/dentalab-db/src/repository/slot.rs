//! # Slot Repository
//!
//! Durable key-value slots. Each slot holds one JSON document and is
//! replaced wholesale on every write (last write wins).
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  put(key, value, writer_id)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO kv_slots ... ON CONFLICT(key) DO UPDATE                    │
//! │       │                                                                 │
//! │       ├── new key:      created_at = updated_at = now                   │
//! │       └── existing key: value, writer_id, updated_at replaced           │
//! │                         created_at kept                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no versioning between writers: two sessions writing the same
//! key simply overwrite each other. `writer_id` records who wrote last.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// A slot row as stored.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoredSlot {
    pub key: String,
    pub value: String,
    pub writer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository for key-value slot operations.
#[derive(Debug, Clone)]
pub struct SlotRepository {
    pool: SqlitePool,
}

impl SlotRepository {
    /// Creates a new SlotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SlotRepository { pool }
    }

    /// Reads a slot.
    ///
    /// ## Returns
    /// `None` when nothing has been written under `key`.
    pub async fn get(&self, key: &str) -> DbResult<Option<StoredSlot>> {
        let slot = sqlx::query_as::<_, StoredSlot>(
            r#"
            SELECT key, value, writer_id, created_at, updated_at
            FROM kv_slots
            WHERE key = ?1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(slot)
    }

    /// Writes a slot, replacing any previous value.
    pub async fn put(&self, key: &str, value: &str, writer_id: Option<&str>) -> DbResult<()> {
        let now = Utc::now();

        debug!(key = %key, bytes = value.len(), "Writing slot");

        sqlx::query(
            r#"
            INSERT INTO kv_slots (key, value, writer_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                writer_id = excluded.writer_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(writer_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes a slot.
    ///
    /// ## Returns
    /// `true` if a slot was removed.
    pub async fn delete(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM kv_slots WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key = %key, removed = result.rows_affected(), "Deleted slot");
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
