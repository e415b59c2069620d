//! Entity store: the single in-memory collection plus its durable mirror.
//!
//! # Responsibility
//! - Own entity creation, update and deletion.
//! - Mirror the whole collection into key-value storage after every mutation.
//! - Restore state on load, falling back to the seed dataset.
//!
//! # Invariants
//! - Entity ids are unique within one store.
//! - `created_at` is never changed by an update.
//! - Persistence failures are logged and never roll back in-memory state.
//! - Every write rewrites the full collection under one storage key.

use crate::model::checklist::RawChecklistItem;
use crate::model::entity::{generate_entity_id, Entity, EntityId};
use crate::model::timestamp;
use crate::repo::kv_repo::{KeyValueStorage, StorageResult};
use crate::search::query::{query, EntityFilters, View};
use crate::service::checklist_service::{build_checklist, reset_all};
use crate::service::seed::seed_entities;
use crate::service::stats_service::{compute_stats, EntityStats};
use crate::service::transfer::{parse_import, ExportSnapshot, ImportError, SCHEMA_VERSION};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// Storage key holding the persisted collection.
pub const STORAGE_KEY: &str = "orgspace_data";

#[derive(Serialize)]
struct PersistedStateRef<'a> {
    entities: &'a [Entity],
    version: &'a str,
}

#[derive(Deserialize)]
struct PersistedState {
    #[serde(default, deserialize_with = "null_as_empty")]
    entities: Vec<Entity>,
}

/// A `null` entity list loads as empty, the same as a missing one.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Entity>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Entity>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Result of [`EntityStore::upsert`].
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    /// Entity had no id; a fresh one was assigned and it was appended.
    Created(Entity),
    /// Entity replaced the stored record with the same id, in place.
    Updated(Entity),
    /// Entity carried an id unknown to the store; nothing changed.
    Ignored(Entity),
}

impl UpsertOutcome {
    pub fn entity(&self) -> &Entity {
        match self {
            Self::Created(entity) | Self::Updated(entity) | Self::Ignored(entity) => entity,
        }
    }

    pub fn into_entity(self) -> Entity {
        match self {
            Self::Created(entity) | Self::Updated(entity) | Self::Ignored(entity) => entity,
        }
    }

    pub fn is_applied(&self) -> bool {
        !matches!(self, Self::Ignored(_))
    }
}

/// Ordered entity collection backed by durable key-value storage.
///
/// One store is constructed per process (or per test) and passed by
/// reference to callers; there is no global instance.
pub struct EntityStore<S: KeyValueStorage> {
    storage: S,
    entities: Vec<Entity>,
}

impl<S: KeyValueStorage> EntityStore<S> {
    /// Creates an empty store without touching storage.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            entities: Vec::new(),
        }
    }

    /// Creates a store and immediately loads persisted state.
    pub fn open(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.load();
        store
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// All entities in insertion order.
    pub fn list(&self) -> &[Entity] {
        &self.entities
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    /// Creates or replaces an entity and persists the collection.
    ///
    /// # Contract
    /// - Empty id: a fresh unique id is assigned, `updated_at` is stamped and
    ///   the entity is appended.
    /// - Known id: the stored record is replaced in place; `created_at` is
    ///   kept from the stored record and `updated_at` is stamped.
    /// - Unknown id: nothing changes and a warning is logged.
    pub fn upsert(&mut self, mut entity: Entity) -> UpsertOutcome {
        let now = timestamp::now();

        if entity.is_new() {
            entity.id = self.fresh_id();
            entity.created_at = timestamp::truncate_to_persisted(entity.created_at);
            entity.updated_at = Some(now);
            self.entities.push(entity.clone());
            info!(
                "event=entity_upsert module=store status=ok action=create entity_id={} type={}",
                entity.id, entity.kind
            );
            self.persist();
            return UpsertOutcome::Created(entity);
        }

        let Some(slot) = self.entities.iter_mut().find(|stored| stored.id == entity.id) else {
            // TODO: confirm with product whether unknown ids should create.
            warn!(
                "event=entity_upsert module=store status=skip action=ignored reason=not_found entity_id={}",
                entity.id
            );
            return UpsertOutcome::Ignored(entity);
        };

        entity.created_at = slot.created_at;
        entity.updated_at = Some(now);
        *slot = entity.clone();
        info!(
            "event=entity_upsert module=store status=ok action=update entity_id={} type={}",
            entity.id, entity.kind
        );
        self.persist();
        UpsertOutcome::Updated(entity)
    }

    /// Hard-deletes an entity. Absent ids are not an error.
    pub fn remove(&mut self, id: &str) -> Option<Entity> {
        let Some(index) = self.position(id) else {
            info!("event=entity_remove module=store status=skip reason=not_found entity_id={id}");
            return None;
        };

        let removed = self.entities.remove(index);
        info!("event=entity_remove module=store status=ok entity_id={id}");
        self.persist();
        Some(removed)
    }

    /// Unchecks every checklist item of one entity and persists.
    pub fn reset_checklist(&mut self, id: &str) -> Option<&Entity> {
        let Some(index) = self.position(id) else {
            warn!("event=checklist_reset module=store status=skip reason=not_found entity_id={id}");
            return None;
        };

        let entity = &mut self.entities[index];
        entity.checklist = reset_all(&entity.checklist);
        info!(
            "event=checklist_reset module=store status=ok entity_id={id} items={}",
            entity.checklist.len()
        );
        self.persist();
        self.entities.get(index)
    }

    /// Replaces one entity's checklist from editor rows and persists.
    pub fn replace_checklist<I>(&mut self, id: &str, raw_items: I) -> Option<&Entity>
    where
        I: IntoIterator<Item = RawChecklistItem>,
    {
        let Some(index) = self.position(id) else {
            warn!(
                "event=checklist_replace module=store status=skip reason=not_found entity_id={id}"
            );
            return None;
        };

        let entity = &mut self.entities[index];
        entity.checklist = build_checklist(raw_items);
        entity.updated_at = Some(timestamp::now());
        info!(
            "event=checklist_replace module=store status=ok entity_id={id} items={}",
            entity.checklist.len()
        );
        self.persist();
        self.entities.get(index)
    }

    /// Restores state from storage, or falls back to the seed dataset.
    ///
    /// Absent, unreadable or undecodable records all take the seed path,
    /// and the seed is persisted immediately. Ids reassigned while loading
    /// are persisted too, so they stay stable across sessions.
    pub fn load(&mut self) -> &[Entity] {
        match self.read_persisted() {
            Ok(Some(mut entities)) => {
                let reassigned = normalize_ids(&mut entities);
                info!(
                    "event=store_load module=store status=ok source=storage entities={} reassigned_ids={}",
                    entities.len(),
                    reassigned
                );
                self.entities = entities;
                if reassigned > 0 {
                    self.persist();
                }
            }
            Ok(None) => {
                info!("event=store_load module=store status=ok source=seed reason=absent");
                self.load_seed();
            }
            Err(reason) => {
                error!("event=store_load module=store status=error source=seed error={reason}");
                self.load_seed();
            }
        }
        &self.entities
    }

    /// Writes the full collection to storage, logging any failure.
    ///
    /// Returns whether the write succeeded. In-memory state is kept either way.
    pub fn persist(&self) -> bool {
        match self.try_persist() {
            Ok(()) => true,
            Err(err) => {
                error!(
                    "event=store_persist module=store status=error entities={} error={err}",
                    self.entities.len()
                );
                false
            }
        }
    }

    /// Writes the full collection to storage, returning the failure.
    pub fn try_persist(&self) -> StorageResult<()> {
        let payload = serde_json::to_string(&PersistedStateRef {
            entities: &self.entities,
            version: SCHEMA_VERSION,
        })?;
        self.storage.write(STORAGE_KEY, &payload)
    }

    /// Replaces the whole collection from an import file.
    ///
    /// On error the store is untouched. Returns the imported entity count.
    pub fn import_json(&mut self, text: &str) -> Result<usize, ImportError> {
        let mut entities = match parse_import(text) {
            Ok(entities) => entities,
            Err(err) => {
                warn!("event=store_import module=store status=error error={err}");
                return Err(err);
            }
        };

        let reassigned = normalize_ids(&mut entities);
        self.entities = entities;
        info!(
            "event=store_import module=store status=ok entities={} reassigned_ids={}",
            self.entities.len(),
            reassigned
        );
        self.persist();
        Ok(self.entities.len())
    }

    /// Snapshot of the current collection stamped with `export_date`.
    pub fn export_snapshot_at(&self, export_date: DateTime<Utc>) -> ExportSnapshot {
        ExportSnapshot::new(self.entities.clone(), export_date)
    }

    pub fn export_snapshot(&self) -> ExportSnapshot {
        self.export_snapshot_at(timestamp::now())
    }

    /// Indented export file contents stamped with the current time.
    pub fn export_json(&self) -> serde_json::Result<String> {
        self.export_snapshot().to_json()
    }

    /// Visible entities for `view` and `filters`, newest first.
    pub fn query(&self, view: View, filters: &EntityFilters) -> Vec<&Entity> {
        query(&self.entities, view, filters)
    }

    pub fn stats(&self) -> EntityStats {
        compute_stats(&self.entities)
    }

    fn load_seed(&mut self) {
        self.entities = seed_entities();
        self.persist();
    }

    fn read_persisted(&self) -> Result<Option<Vec<Entity>>, String> {
        let Some(raw) = self.storage.read(STORAGE_KEY).map_err(|err| err.to_string())? else {
            return Ok(None);
        };
        let state: PersistedState =
            serde_json::from_str(&raw).map_err(|err| format!("corrupt record: {err}"))?;
        Ok(Some(state.entities))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entities.iter().position(|entity| entity.id == id)
    }

    fn fresh_id(&self) -> EntityId {
        loop {
            let candidate = generate_entity_id();
            if self.get(&candidate).is_none() {
                return candidate;
            }
        }
    }
}

/// Gives blank or duplicate ids a fresh value; returns how many changed.
fn normalize_ids(entities: &mut [Entity]) -> usize {
    let mut seen = HashSet::new();
    let mut reassigned = 0;
    for entity in entities.iter_mut() {
        if entity.is_new() || seen.contains(&entity.id) {
            entity.id = generate_entity_id();
            reassigned += 1;
        }
        seen.insert(entity.id.clone());
    }
    reassigned
}

#[cfg(test)]
mod tests {
    use super::normalize_ids;
    use crate::model::entity::{Entity, EntityType};

    #[test]
    fn normalize_ids_fills_blank_and_duplicate_ids() {
        let mut first = Entity::new(EntityType::Task, "a");
        first.id = "same".to_string();
        let mut second = first.clone();
        second.title = "b".to_string();
        let third = Entity::new(EntityType::Note, "c");
        let mut entities = vec![first, second, third];

        assert_eq!(normalize_ids(&mut entities), 2);
        assert_eq!(entities[0].id, "same");
        assert_ne!(entities[1].id, "same");
        assert!(!entities[2].id.is_empty());
    }
}
