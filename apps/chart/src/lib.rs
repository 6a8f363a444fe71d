//! # Dentalab Chart Library
//!
//! Tooth chart backend: managed selection state, its persistence, and one
//! command per chart operation.
//!
//! ## Module Organization
//! ```text
//! dentalab_chart/
//! ├── lib.rs            ◄─── You are here (tracing, bootstrap)
//! ├── state/
//! │   ├── mod.rs        ◄─── State type exports
//! │   ├── config.rs     ◄─── ChartConfig (env + defaults)
//! │   ├── persistence.rs◄─── Snapshot load/save under one slot key
//! │   └── selection.rs  ◄─── SelectionState (Arc<Mutex<ToothSelection>>)
//! ├── commands/
//! │   ├── mod.rs        ◄─── Command exports, ChartResponse
//! │   ├── selection.rs  ◄─── General selection, active category
//! │   ├── extraction.rs ◄─── Category teeth, overlap cleanup
//! │   ├── product.rs    ◄─── Product caches
//! │   └── storage.rs    ◄─── Snapshot, reload, reset
//! └── error.rs          ◄─── API error type for commands
//! ```
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  init_tracing()                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ChartConfig::from_env()                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  bootstrap(config)                                                      │
//! │       ├── persist off ─────────────► in-memory SelectionState          │
//! │       ├── database opens ──────────► SQLite-backed SelectionState      │
//! │       └── database fails ──────────► warn!, in-memory SelectionState   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  hydrate(): merge persisted snapshot into the empty live chart          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dentalab_db::{Database, DbConfig};
use state::{ChartConfig, Persistence, SelectionState};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,dentalab=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=dentalab=trace` - Show trace for dentalab crates only
/// - Default: INFO, with DEBUG for dentalab crates
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Builds the chart state and restores the persisted selection.
///
/// Never fails: when the database cannot be opened the chart runs in
/// memory only.
pub async fn bootstrap(config: ChartConfig) -> SelectionState {
    let state = if config.persist {
        let db_path = config.resolve_database_path();
        info!(?db_path, "Database path determined");

        match Database::new(DbConfig::new(db_path)).await {
            Ok(db) => {
                info!("Database connected and migrations applied");
                let persistence = Persistence::sqlite(db, config.storage_key.clone());
                SelectionState::new(persistence, config)
            }
            Err(e) => {
                warn!("Persistence disabled, database unavailable: {}", e);
                SelectionState::in_memory(config)
            }
        }
    } else {
        info!("Persistence disabled by configuration");
        SelectionState::in_memory(config)
    };

    state.hydrate().await;
    info!(
        persisted = state.persistence().is_enabled(),
        key = %state.config().storage_key,
        "Chart state initialized"
    );
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use dentalab_core::{Arch, Tooth};

    fn temp_db_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("dentalab-{}-{}.db", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_default_log_filter_levels() {
        use tracing::Level;

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(DEFAULT_LOG_FILTER))
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(target: "dentalab_chart::state", Level::DEBUG));
            assert!(!tracing::enabled!(target: "dentalab_chart::state", Level::TRACE));
            assert!(!tracing::enabled!(target: "sqlx::query", Level::INFO));
            assert!(tracing::enabled!(target: "sqlx::query", Level::WARN));
            assert!(!tracing::enabled!(target: "hyper", Level::DEBUG));
        });
    }

    #[tokio::test]
    async fn test_bootstrap_without_persistence() {
        let config = ChartConfig {
            persist: false,
            ..ChartConfig::default()
        };
        let state = bootstrap(config).await;
        assert!(!state.persistence().is_enabled());
        assert!(state.with_selection(|chart| chart.is_empty()));
    }

    #[tokio::test]
    async fn test_bootstrap_restores_previous_session() {
        let config = ChartConfig {
            database_path: Some(temp_db_path("restore")),
            ..ChartConfig::default()
        };

        let first = bootstrap(config.clone()).await;
        assert!(first.persistence().is_enabled());
        commands::toggle_tooth(&first, Arch::Maxillary, 12).await.unwrap();

        let second = bootstrap(config.clone()).await;
        assert_eq!(
            commands::get_selected_teeth(&second, Arch::Maxillary).await,
            vec![Tooth::new(12)]
        );

        if let Some(path) = &config.database_path {
            let _ = std::fs::remove_file(path);
        }
    }

    #[tokio::test]
    async fn test_bootstrap_falls_back_when_database_unavailable() {
        let config = ChartConfig {
            database_path: Some(std::path::PathBuf::from("/nonexistent-dir/deeper/chart.db")),
            ..ChartConfig::default()
        };

        let state = bootstrap(config).await;
        assert!(!state.persistence().is_enabled());

        let toggled = commands::toggle_tooth(&state, Arch::Mandibular, 18).await.unwrap();
        assert!(toggled.selected);
    }
}
