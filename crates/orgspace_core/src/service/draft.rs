//! Form-value adapter that turns raw editor strings into an `Entity`.
//!
//! # Responsibility
//! - Coerce untyped form fields (type, priority, dates, tags) into the model.
//! - Carry identity and caller-owned data over when editing.
//!
//! # Invariants
//! - Editing never changes `id`, `created_at` or `custom_fields`.
//! - Tags are trimmed and empty tags are dropped.
//! - Checklist rows pass through `build_checklist`.

use crate::model::checklist::RawChecklistItem;
use crate::model::entity::{
    Entity, EntityId, EntityStatus, EntityType, EntityValidationError, Priority, DEFAULT_COLOR,
};
use crate::model::timestamp::{self, format_date, parse_date};
use crate::service::checklist_service::build_checklist;
use serde_json::Map;

/// Raw values collected from an entity editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDraft {
    pub kind: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    /// `YYYY-MM-DD` or empty.
    pub due_date: String,
    pub color: String,
    /// Comma-separated tag list.
    pub tags: String,
    pub checklist: Vec<RawChecklistItem>,
}

impl Default for EntityDraft {
    fn default() -> Self {
        Self {
            kind: EntityType::Task.as_str().to_string(),
            title: String::new(),
            description: String::new(),
            status: EntityStatus::Active.as_str().to_string(),
            priority: Priority::default().as_str().to_string(),
            due_date: String::new(),
            color: DEFAULT_COLOR.to_string(),
            tags: String::new(),
            checklist: Vec::new(),
        }
    }
}

impl EntityDraft {
    /// Prefills a draft for editing an existing entity.
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            kind: entity.kind.as_str().to_string(),
            title: entity.title.clone(),
            description: entity.description.clone().unwrap_or_default(),
            status: entity.status.as_str().to_string(),
            priority: entity.priority.as_str().to_string(),
            due_date: entity.due_date.as_ref().map(format_date).unwrap_or_default(),
            color: entity.color.clone(),
            tags: entity.tags.join(", "),
            checklist: entity.checklist.iter().map(RawChecklistItem::from).collect(),
        }
    }

    /// Builds the entity to hand to `EntityStore::upsert`.
    ///
    /// With `existing = None` the id is left empty so the store creates a new
    /// entity. Otherwise `id`, `created_at` and `custom_fields` are copied
    /// from `existing`.
    ///
    /// # Errors
    /// - Empty title, unknown type or priority, malformed color or due date.
    pub fn into_entity(self, existing: Option<&Entity>) -> Result<Entity, EntityValidationError> {
        let kind = EntityType::parse(&self.kind)
            .ok_or_else(|| EntityValidationError::UnknownType(self.kind.clone()))?;
        let priority = Priority::parse(&self.priority)
            .ok_or_else(|| EntityValidationError::UnknownPriority(self.priority.clone()))?;
        let due_date = match self.due_date.trim() {
            "" => None,
            raw => Some(
                parse_date(raw)
                    .ok_or_else(|| EntityValidationError::InvalidDueDate(raw.to_string()))?,
            ),
        };
        let status = match self.status.trim() {
            "" => EntityStatus::Active,
            raw => EntityStatus::from(raw),
        };
        let description = Some(self.description.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        let (id, created_at, custom_fields) = match existing {
            Some(existing) => (
                existing.id.clone(),
                existing.created_at,
                existing.custom_fields.clone(),
            ),
            None => (EntityId::new(), timestamp::now(), Map::new()),
        };

        let entity = Entity {
            id,
            kind,
            title: self.title.trim().to_string(),
            description,
            status,
            priority,
            tags: split_tags(&self.tags),
            color: self.color.trim().to_string(),
            created_at,
            updated_at: existing.and_then(|existing| existing.updated_at),
            due_date,
            checklist: build_checklist(self.checklist),
            custom_fields,
        };
        entity.validate()?;
        Ok(entity)
    }
}

/// Splits a comma-separated tag field, trimming and dropping empty entries.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
