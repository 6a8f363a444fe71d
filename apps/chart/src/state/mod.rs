//! # State Module
//!
//! Manages chart state shared by every command.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  bootstrap(config)                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      SelectionState                             │   │
//! │  │  ┌──────────────────┐ ┌──────────────────┐ ┌─────────────────┐  │   │
//! │  │  │ Arc<Mutex<       │ │ Persistence      │ │ ChartConfig     │  │   │
//! │  │  │  ToothSelection  │ │  Database (pool) │ │  storage_key    │  │   │
//! │  │  │ >>               │ │  slot key        │ │  strict numbers │  │   │
//! │  │  └──────────────────┘ └──────────────────┘ └─────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Selection: Arc<Mutex<T>>, never locked across an .await             │
//! │  • Persistence: Database has an internal connection pool               │
//! │  • ChartConfig: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod persistence;
mod selection;

pub use config::ChartConfig;
pub use persistence::{load_snapshot, save_snapshot, Persistence};
pub use selection::SelectionState;
