//! # Dentalab Chart Entry Point
//!
//! Diagnostic binary: loads the persisted chart the same way the app does
//! at startup and prints it as JSON.
//!
//! ## Usage
//! ```text
//! dentalab-chart              print the restored chart
//! dentalab-chart --cleanup    resolve overlapping teeth first (persists)
//! dentalab-chart --snapshot   print the raw persisted format instead
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Read configuration from `DENTALAB_*` variables
//! 3. Open the database and merge the persisted snapshot
//! 4. Print

use dentalab_chart::state::ChartConfig;
use dentalab_chart::{bootstrap, commands, init_tracing};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cleanup = args.iter().any(|a| a == "--cleanup");
    let raw_snapshot = args.iter().any(|a| a == "--snapshot");

    info!("Starting Dentalab chart");
    let state = bootstrap(ChartConfig::from_env()).await;

    if cleanup {
        let response = commands::cleanup_overlapping_teeth(&state).await;
        info!(conflicts = response.resolved.len(), "Cleanup finished");
    }

    let output = if raw_snapshot {
        serde_json::to_string_pretty(&commands::get_snapshot(&state).await)
    } else {
        serde_json::to_string_pretty(&commands::get_selection(&state).await)
    };

    match output {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("Failed to render chart: {}", e);
            std::process::exit(1);
        }
    }
}
