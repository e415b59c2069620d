//! Entity-centric domain model for projects, tasks, goals, notes and checklists.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep one entity shape for every view/type combination.
//!
//! # Invariants
//! - Every entity is identified by an opaque `EntityId` unique within a store.
//! - Deletion is a hard delete; no tombstones are kept.
//! - Wire field names are camelCase to stay compatible with exported files.

pub mod checklist;
pub mod entity;
pub mod timestamp;
