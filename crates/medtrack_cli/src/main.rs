//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `medtrack_core` linkage and on-device storage independently of
//!   the Flutter runtime.
//! - Keep output deterministic for quick local sanity checks.

use medtrack_core::{db_path_from_env, MedicationRepository, SqliteStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("medtrack_core ping={}", medtrack_core::ping());
    println!("medtrack_core version={}", medtrack_core::core_version());

    let db_path = db_path_from_env();
    match SqliteStore::open(&db_path) {
        Ok(store) => {
            let medications = MedicationRepository::new(store).get_all();
            println!("medtrack_core db={}", db_path.display());
            println!("medtrack_core medications={}", medications.len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("medtrack_core db={} error={err}", db_path.display());
            ExitCode::FAILURE
        }
    }
}
