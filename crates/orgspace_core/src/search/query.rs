//! View-scoped filtering and ordering of entities.
//!
//! # Responsibility
//! - Derive the visible subset of entities for one view and filter set.
//! - Provide a deterministic, newest-first ordering.
//!
//! # Invariants
//! - Querying never mutates the input collection or the filters.
//! - All active criteria are conjunctive.
//! - Sorting is stable: equal `created_at` values keep input order.

use crate::model::entity::{Entity, EntityType};
use std::fmt::{Display, Formatter};

/// Named navigation context that may restrict entities to one type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum View {
    #[default]
    Dashboard,
    Projects,
    Tasks,
    Goals,
    Notes,
    Checklists,
    Calendar,
    Habits,
    Custom,
}

impl View {
    pub const ALL: [View; 9] = [
        View::Dashboard,
        View::Projects,
        View::Tasks,
        View::Goals,
        View::Notes,
        View::Checklists,
        View::Calendar,
        View::Habits,
        View::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Projects => "projects",
            Self::Tasks => "tasks",
            Self::Goals => "goals",
            Self::Notes => "notes",
            Self::Checklists => "checklists",
            Self::Calendar => "calendar",
            Self::Habits => "habits",
            Self::Custom => "custom",
        }
    }

    /// Parses a lowercase view name. Unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|view| view.as_str() == normalized)
    }

    /// Type every entity must have to appear in this view.
    ///
    /// `Dashboard` and `Custom` show every entity; custom items have no
    /// dedicated type mapping.
    pub fn required_type(self) -> Option<EntityType> {
        match self {
            Self::Projects => Some(EntityType::Project),
            Self::Tasks => Some(EntityType::Task),
            Self::Goals => Some(EntityType::Goal),
            Self::Notes => Some(EntityType::Note),
            Self::Checklists => Some(EntityType::Checklist),
            Self::Habits => Some(EntityType::Habit),
            Self::Calendar => Some(EntityType::Event),
            Self::Dashboard | Self::Custom => None,
        }
    }

    /// Page heading for this view.
    pub fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Projects => "Projects",
            Self::Tasks => "Tasks",
            Self::Goals => "Goals",
            Self::Notes => "Notes",
            Self::Checklists => "Checklists",
            Self::Calendar => "Calendar",
            Self::Habits => "Habits",
            Self::Custom => "Custom Items",
        }
    }

    pub fn subtitle(self) -> &'static str {
        match self {
            Self::Dashboard => "Overview of all your activities",
            Self::Projects => "Manage your projects and workflows",
            Self::Tasks => "Track and complete your tasks",
            Self::Goals => "Set and achieve your long-term goals",
            Self::Notes => "Capture ideas and information",
            Self::Checklists => "Reusable checklists for routines and processes",
            Self::Calendar => "Schedule and manage events",
            Self::Habits => "Build positive habits",
            Self::Custom => "Your custom tracked items",
        }
    }
}

impl Display for View {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter criteria; empty strings mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityFilters {
    /// Exact match on the status wire value.
    pub status: String,
    /// Exact match on the priority wire value.
    pub priority: String,
    /// Case-insensitive substring over title, description and tags.
    pub search: String,
}

impl EntityFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Resets every criterion, as done when the user switches views.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_empty() && self.priority.is_empty() && self.search.is_empty()
    }

    /// Returns whether `entity` satisfies every non-empty criterion.
    pub fn matches(&self, entity: &Entity) -> bool {
        if !self.status.is_empty() && entity.status.as_str() != self.status {
            return false;
        }
        if !self.priority.is_empty() && entity.priority.as_str() != self.priority {
            return false;
        }
        if !self.search.is_empty() && !matches_search(entity, &self.search.to_lowercase()) {
            return false;
        }
        true
    }
}

/// Returns the entities visible in `view` under `filters`, newest first.
pub fn query<'a>(entities: &'a [Entity], view: View, filters: &EntityFilters) -> Vec<&'a Entity> {
    let required_type = view.required_type();
    let mut visible = entities
        .iter()
        .filter(|entity| required_type.map_or(true, |kind| entity.kind == kind))
        .filter(|entity| filters.matches(entity))
        .collect::<Vec<_>>();

    // `sort_by` is stable, which keeps input order for equal timestamps.
    visible.sort_by(|left, right| right.created_at.cmp(&left.created_at));
    visible
}

fn matches_search(entity: &Entity, needle: &str) -> bool {
    entity.title.to_lowercase().contains(needle)
        || entity
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(needle))
        || entity
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}
