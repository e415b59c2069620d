//! Checklist building, progress and bulk reset.
//!
//! # Invariants
//! - Built checklists never contain items with blank text.
//! - Every built item has an id; existing ids are kept.
//! - Item order is preserved by every operation.

use crate::model::checklist::{generate_item_id, ChecklistItem, RawChecklistItem};
use crate::service::stats_service::rounded_percent;

/// Completion summary for one checklist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChecklistProgress {
    pub completed: usize,
    pub total: usize,
    /// `round(completed / total * 100)`, or 0 for an empty checklist.
    pub percent: u32,
}

/// Converts editor rows into persisted checklist items.
///
/// Rows whose trimmed text is empty are dropped; blank or missing ids are
/// replaced by fresh ones.
pub fn build_checklist<I>(raw_items: I) -> Vec<ChecklistItem>
where
    I: IntoIterator<Item = RawChecklistItem>,
{
    raw_items
        .into_iter()
        .filter_map(|raw| {
            let text = raw.text.trim();
            if text.is_empty() {
                return None;
            }
            let id = raw
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(generate_item_id);
            Some(ChecklistItem {
                id,
                text: text.to_string(),
                completed: raw.completed,
            })
        })
        .collect()
}

pub fn progress(checklist: &[ChecklistItem]) -> ChecklistProgress {
    let total = checklist.len();
    let completed = checklist.iter().filter(|item| item.completed).count();
    ChecklistProgress {
        completed,
        total,
        percent: rounded_percent(completed, total),
    }
}

/// Returns a copy with every item unchecked.
pub fn reset_all(checklist: &[ChecklistItem]) -> Vec<ChecklistItem> {
    checklist
        .iter()
        .map(|item| ChecklistItem {
            completed: false,
            ..item.clone()
        })
        .collect()
}
