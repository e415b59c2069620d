//! Checklist sub-records owned by an entity.
//!
//! # Invariants
//! - Vector order is display order.
//! - Persisted items always have non-empty, trimmed `text`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One completable step inside an entity checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Unique item id (unique within its checklist).
    pub id: String,
    /// Display text, trimmed and non-empty once built.
    pub text: String,
    pub completed: bool,
}

impl ChecklistItem {
    /// Creates an unchecked item with a generated id.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: generate_item_id(),
            text: text.into(),
            completed: false,
        }
    }
}

/// Unvalidated checklist row as collected from an editor.
///
/// `id` is `None` for rows that were added in the current editing session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawChecklistItem {
    pub id: Option<String>,
    pub text: String,
    pub completed: bool,
}

impl RawChecklistItem {
    pub fn new(text: impl Into<String>, completed: bool) -> Self {
        Self {
            id: None,
            text: text.into(),
            completed,
        }
    }

    pub fn with_id(id: impl Into<String>, text: impl Into<String>, completed: bool) -> Self {
        Self {
            id: Some(id.into()),
            text: text.into(),
            completed,
        }
    }
}

impl From<&ChecklistItem> for RawChecklistItem {
    fn from(value: &ChecklistItem) -> Self {
        Self::with_id(value.id.clone(), value.text.clone(), value.completed)
    }
}

pub(crate) fn generate_item_id() -> String {
    Uuid::new_v4().to_string()
}
