//! Entity query entry points.
//!
//! # Responsibility
//! - Expose view/filter/search derivation over an in-memory entity set.
//! - Keep result ordering rules inside core.

pub mod query;
