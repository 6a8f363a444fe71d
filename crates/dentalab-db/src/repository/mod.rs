//! # Repository Module
//!
//! Database repository implementations.
//!
//! ```text
//! Chart persistence
//!      │
//!      │  db.slots().put("teeth-selection-storage", json, writer)
//!      ▼
//! SlotRepository
//! ├── get(&self, key)
//! ├── put(&self, key, value, writer_id)
//! └── delete(&self, key)
//!      │
//!      ▼
//! kv_slots table
//! ```
//!
//! ## Available Repositories
//!
//! - [`slot::SlotRepository`] - Durable key-value slots

pub mod slot;
