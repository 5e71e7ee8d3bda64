//! Core domain logic for MedTrack.
//! This crate owns medication persistence and list/form use-cases; UI
//! layers call in through `medtrack_ffi`.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{db_path_from_env, DB_PATH_ENV};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::medication::{Medication, MedicationDraft, MedicationId};
pub use repo::medication_repo::{MedicationRepository, RepoError, RepoResult, MEDICATIONS_KEY};
pub use service::medication_service::{
    parse_pill_count, MedicationService, ServiceError, ServiceResult,
};
pub use service::refill::{PillSupply, RefillUrgency, SupplyLevel};
pub use service::summary::{MedicationSummary, RefillBadge, SupplySummary};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
