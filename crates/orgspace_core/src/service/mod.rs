//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate storage calls into use-case level APIs (`EntityStore`).
//! - Host the pure checklist, statistics and import/export rules.
//! - Keep presentation layers decoupled from storage details.

pub mod checklist_service;
pub mod draft;
pub mod entity_store;
pub mod seed;
pub mod stats_service;
pub mod transfer;
