//! Dashboard statistics derived from the entity set.

use crate::model::entity::{Entity, EntityType};

/// Summary counters shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityStats {
    /// Active entities of type `project`.
    pub active_projects: usize,
    /// Active entities of type `task`.
    pub active_tasks: usize,
    /// Share of completed entities, rounded to a whole percent.
    pub completion_rate: u32,
}

pub fn compute_stats(entities: &[Entity]) -> EntityStats {
    let active_of = |kind: EntityType| {
        entities
            .iter()
            .filter(|entity| entity.is_active() && entity.kind == kind)
            .count()
    };
    let completed = entities.iter().filter(|entity| entity.is_completed()).count();

    EntityStats {
        active_projects: active_of(EntityType::Project),
        active_tasks: active_of(EntityType::Task),
        completion_rate: rounded_percent(completed, entities.len()),
    }
}

/// `round(part / whole * 100)` with halves rounded up; 0 when `whole == 0`.
pub(crate) fn rounded_percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let scaled = (part as u64 * 200 + whole as u64) / (whole as u64 * 2);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}
