//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `defcon_core` linkage without the Flutter runtime.
//! - Optionally print the grouped board stored in an existing database file.
//!
//! Usage: `defcon_cli [db_path]`

use defcon_core::{StoreConfig, TodoService};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("defcon_core ping={}", defcon_core::ping());
    println!("defcon_core version={}", defcon_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let config = match existing_store_config(&db_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let service = match TodoService::open(&config) {
        Ok(service) => service,
        Err(err) => {
            eprintln!("failed to open {}: {err}", config.db_path.display());
            return ExitCode::FAILURE;
        }
    };

    let groups = service.grouped();
    if groups.is_empty() {
        println!("C'mon do something.");
    }
    for (level, tasks) in &groups {
        println!("{}", level.label());
        for task in tasks {
            let mark = if task.completed { "x" } else { " " };
            println!("  [{mark}] {} (id={})", task.task, task.id);
        }
    }

    let state = service.failure_state();
    println!(
        "failed={} overdue={} indicator_visible={}",
        state.failed, state.overdue, state.indicator_visible
    );
    ExitCode::SUCCESS
}

/// Builds a store config for a database file that must already exist, so a
/// mistyped path is reported instead of silently creating an empty store.
fn existing_store_config(db_path: &str) -> Result<StoreConfig, String> {
    let path = Path::new(db_path);
    if !path.is_file() {
        return Err(format!("no task database at {}", path.display()));
    }
    Ok(StoreConfig {
        db_path: path.to_path_buf(),
        ..StoreConfig::default()
    })
}
