//! Entity domain model.
//!
//! # Responsibility
//! - Define the canonical record shared by every view (projects, tasks, ...).
//! - Provide type-level predicates used by checklist and statistics logic.
//!
//! # Invariants
//! - `id` is stable and never reused for another entity in the same store.
//! - `created_at` is assigned once and never changed by updates.
//! - `status` is an open set; unknown values round-trip unchanged.

use crate::model::checklist::ChecklistItem;
use crate::model::timestamp;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Default display color for entities created without one.
pub const DEFAULT_COLOR: &str = "#6366f1";

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid hex color regex")
});

/// Opaque identifier for an entity.
///
/// Kept as a plain string because imported files may carry ids generated by
/// other tools. An empty id means "not created yet".
pub type EntityId = String;

/// Category of an entity; selects its view and checklist affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Project,
    Task,
    Goal,
    Note,
    Checklist,
    Habit,
    Event,
    Custom,
}

impl EntityType {
    pub const ALL: [EntityType; 8] = [
        EntityType::Project,
        EntityType::Task,
        EntityType::Goal,
        EntityType::Note,
        EntityType::Checklist,
        EntityType::Habit,
        EntityType::Event,
        EntityType::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Task => "task",
            Self::Goal => "goal",
            Self::Note => "note",
            Self::Checklist => "checklist",
            Self::Habit => "habit",
            Self::Event => "event",
            Self::Custom => "custom",
        }
    }

    /// Parses the lowercase wire name.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value.trim())
    }

    /// Whether the editor shows a checklist for this type.
    pub fn supports_checklist(self) -> bool {
        matches!(
            self,
            Self::Project | Self::Goal | Self::Task | Self::Checklist
        )
    }

    /// Whether the "uncheck all" affordance is offered.
    ///
    /// Only standalone checklists are reusable routines.
    pub fn supports_checklist_reset(self) -> bool {
        self == Self::Checklist
    }
}

impl Display for EntityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity lifecycle state.
///
/// `active` and `completed` drive statistics; any other value supplied by a
/// caller is kept verbatim in `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityStatus {
    #[default]
    Active,
    Completed,
    Other(String),
}

impl EntityStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl From<String> for EntityStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "active" => Self::Active,
            "completed" => Self::Completed,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for EntityStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<EntityStatus> for String {
    fn from(value: EntityStatus) -> Self {
        match value {
            EntityStatus::Other(value) => value,
            other => other.as_str().to_string(),
        }
    }
}

impl Display for EntityStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical record for every organizable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Opaque stable id; empty until the store creates the entity.
    #[serde(default)]
    pub id: EntityId,
    /// Serialized as `type` to match the exported file schema.
    #[serde(rename = "type")]
    pub kind: EntityType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: EntityStatus,
    #[serde(default)]
    pub priority: Priority,
    /// Trimmed, non-empty strings. Duplicates are allowed.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Hex display color.
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(with = "timestamp::required")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::optional"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::optional_date"
    )]
    pub due_date: Option<NaiveDate>,
    /// Ordered sub-items. Empty for types without checklist support.
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    /// Free-form data owned by callers; never interpreted by core.
    #[serde(default)]
    pub custom_fields: Map<String, Value>,
}

impl Entity {
    /// Creates a not-yet-stored entity stamped with the current time.
    ///
    /// The id stays empty so that `EntityStore::upsert` appends it.
    pub fn new(kind: EntityType, title: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            kind,
            title: title.into(),
            description: None,
            status: EntityStatus::Active,
            priority: Priority::default(),
            tags: Vec::new(),
            color: default_color(),
            created_at: timestamp::now(),
            updated_at: None,
            due_date: None,
            checklist: Vec::new(),
            custom_fields: Map::new(),
        }
    }

    /// Whether this entity has not been assigned an id yet.
    pub fn is_new(&self) -> bool {
        self.id.trim().is_empty()
    }

    pub fn is_active(&self) -> bool {
        self.status == EntityStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        self.status == EntityStatus::Completed
    }

    /// Validates caller-facing field invariants.
    ///
    /// The store does not call this; form adapters do before upserting.
    pub fn validate(&self) -> Result<(), EntityValidationError> {
        if self.title.trim().is_empty() {
            return Err(EntityValidationError::EmptyTitle);
        }
        if !is_hex_color(&self.color) {
            return Err(EntityValidationError::InvalidColor(self.color.clone()));
        }
        if self.tags.iter().any(|tag| tag.trim().is_empty()) {
            return Err(EntityValidationError::EmptyTag);
        }
        if self.checklist.iter().any(|item| item.text.trim().is_empty()) {
            return Err(EntityValidationError::EmptyChecklistItem);
        }
        Ok(())
    }
}

/// Validation errors for caller-built entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityValidationError {
    EmptyTitle,
    UnknownType(String),
    UnknownPriority(String),
    InvalidColor(String),
    InvalidDueDate(String),
    EmptyTag,
    EmptyChecklistItem,
}

impl Display for EntityValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title cannot be empty"),
            Self::UnknownType(value) => write!(f, "unknown entity type `{value}`"),
            Self::UnknownPriority(value) => write!(f, "unknown priority `{value}`"),
            Self::InvalidColor(value) => {
                write!(f, "color `{value}` must be a hex value like #6366f1")
            }
            Self::InvalidDueDate(value) => {
                write!(f, "due date `{value}` must use YYYY-MM-DD")
            }
            Self::EmptyTag => write!(f, "tags cannot be empty"),
            Self::EmptyChecklistItem => write!(f, "checklist item text cannot be empty"),
        }
    }
}

impl Error for EntityValidationError {}

/// Generates a fresh entity id.
pub fn generate_entity_id() -> EntityId {
    Uuid::new_v4().to_string()
}

/// Returns whether `value` is a `#rgb` or `#rrggbb` color.
pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR_RE.is_match(value)
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

#[cfg(test)]
mod tests {
    use super::{is_hex_color, EntityStatus, EntityType, Priority};

    #[test]
    fn checklist_support_matches_editor_rules() {
        let supported: Vec<_> = EntityType::ALL
            .into_iter()
            .filter(|kind| kind.supports_checklist())
            .collect();
        assert_eq!(
            supported,
            vec![
                EntityType::Project,
                EntityType::Task,
                EntityType::Goal,
                EntityType::Checklist
            ]
        );
        assert!(EntityType::Checklist.supports_checklist_reset());
        assert!(!EntityType::Project.supports_checklist_reset());
    }

    #[test]
    fn status_keeps_unknown_values() {
        assert_eq!(EntityStatus::from("active"), EntityStatus::Active);
        let paused = EntityStatus::from("paused");
        assert_eq!(paused.as_str(), "paused");
        assert_eq!(String::from(paused), "paused");
    }

    #[test]
    fn parse_round_trips_wire_names() {
        for kind in EntityType::ALL {
            assert_eq!(EntityType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(Priority::parse("high"), Some(Priority::High));
        assert_eq!(Priority::parse("urgent"), None);
    }

    #[test]
    fn hex_color_accepts_short_and_long_forms() {
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#6366F1"));
        assert!(!is_hex_color("6366f1"));
        assert!(!is_hex_color("#12345"));
    }
}
