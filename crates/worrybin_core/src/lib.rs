//! Core domain logic for Worry Bin.
//! This crate owns the worry record, its persistence and the list state.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig, TogglePersistence};
pub use logging::{default_log_level, init_logging, init_logging_with_config, logging_status};
pub use model::worry::{now_epoch_ms, Worry, WorryId, WorryValidationError};
pub use repo::worry_repo::{RepoError, RepoResult, WorryRepository};
pub use service::worry_list::{
    AudioCue, DeleteOutcome, NoopHooks, SubscriptionId, WorryListController, WorryListHooks,
};
pub use store::record_store::{RecordStore, SqliteRecordStore, StoreError, StoreResult};

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
