//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable storage contract used by the entity store.
//! - Isolate SQLite details from service orchestration.
//!
//! # Invariants
//! - Storage is whole-record: callers always write a complete value.

pub mod kv_repo;
