//! Core domain logic for OrgSpace.
//! This crate is the single source of truth for entity, filtering and
//! persistence invariants; presentation layers only call into it.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{load_config, ConfigError, OrgspaceConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::checklist::{ChecklistItem, RawChecklistItem};
pub use model::entity::{
    Entity, EntityId, EntityStatus, EntityType, EntityValidationError, Priority,
};
pub use repo::kv_repo::{
    KeyValueStorage, MemoryKeyValueStorage, SqliteKeyValueStorage, StorageError, StorageResult,
};
pub use search::query::{query, EntityFilters, View};
pub use service::checklist_service::{build_checklist, progress, reset_all, ChecklistProgress};
pub use service::draft::EntityDraft;
pub use service::entity_store::{EntityStore, UpsertOutcome, STORAGE_KEY};
pub use service::stats_service::{compute_stats, EntityStats};
pub use service::transfer::{export_file_name, ExportSnapshot, ImportError, SCHEMA_VERSION};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
