use orgspace_core::db::{open_db, open_db_in_memory};
use orgspace_core::service::seed::SEED_ENTITY_COUNT;
use orgspace_core::{
    Entity, EntityFilters, EntityStatus, EntityStore, EntityType, ImportError, KeyValueStorage,
    MemoryKeyValueStorage, RawChecklistItem, SqliteKeyValueStorage, StorageError, StorageResult,
    UpsertOutcome, View, SCHEMA_VERSION, STORAGE_KEY,
};
use std::cell::Cell;
use std::collections::HashSet;

fn empty_store() -> EntityStore<MemoryKeyValueStorage> {
    let storage = MemoryKeyValueStorage::with_record(
        STORAGE_KEY,
        format!(r#"{{"entities":[],"version":"{SCHEMA_VERSION}"}}"#),
    );
    EntityStore::open(storage)
}

fn entity_at(kind: EntityType, title: &str, created_at: &str) -> Entity {
    let mut entity = Entity::new(kind, title);
    entity.created_at = created_at.parse().unwrap();
    entity
}

fn stored_payload<S: KeyValueStorage>(store: &EntityStore<S>) -> String {
    store.storage().read(STORAGE_KEY).unwrap().unwrap()
}

/// Storage double whose writes can be switched to fail.
#[derive(Default)]
struct FlakyStorage {
    inner: MemoryKeyValueStorage,
    fail_writes: Cell<bool>,
    fail_reads: Cell<bool>,
}

impl KeyValueStorage for FlakyStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        if self.fail_reads.get() {
            return Err(StorageError::Unavailable("read disabled".to_string()));
        }
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes.get() {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        self.inner.write(key, value)
    }
}

#[test]
fn upsert_without_id_assigns_fresh_unique_id_and_appends() {
    let mut store = empty_store();

    let first = store
        .upsert(Entity::new(EntityType::Task, "first"))
        .into_entity();
    let second = store
        .upsert(Entity::new(EntityType::Note, "second"))
        .into_entity();

    assert!(!first.id.is_empty());
    assert_ne!(first.id, second.id);
    assert!(first.updated_at.is_some());

    let matching = store
        .list()
        .iter()
        .filter(|entity| entity.id == first.id)
        .count();
    assert_eq!(matching, 1);
    assert_eq!(store.list()[0].id, first.id);
    assert_eq!(store.list()[1].id, second.id);
}

#[test]
fn upsert_with_known_id_replaces_in_place_and_keeps_created_at() {
    let mut store = empty_store();
    let a = store
        .upsert(entity_at(EntityType::Task, "a", "2025-01-01T00:00:00Z"))
        .into_entity();
    let b = store
        .upsert(entity_at(EntityType::Task, "b", "2025-01-02T00:00:00Z"))
        .into_entity();

    let mut edited = a.clone();
    edited.title = "a (edited)".to_string();
    edited.status = EntityStatus::Completed;
    edited.created_at = "2030-01-01T00:00:00Z".parse().unwrap();

    let outcome = store.upsert(edited);
    assert!(matches!(outcome, UpsertOutcome::Updated(_)));

    let list = store.list();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id, a.id);
    assert_eq!(list[0].title, "a (edited)");
    assert_eq!(list[0].created_at, a.created_at);
    assert!(list[0].updated_at.is_some());
    assert_eq!(list[1].id, b.id);
}

#[test]
fn upsert_with_unknown_id_is_a_no_op() {
    let mut store = empty_store();
    store.upsert(Entity::new(EntityType::Task, "kept"));
    let before = stored_payload(&store);

    let mut stray = Entity::new(EntityType::Task, "stray");
    stray.id = "does-not-exist".to_string();
    let outcome = store.upsert(stray);

    assert!(!outcome.is_applied());
    assert_eq!(outcome.entity().id, "does-not-exist");
    assert_eq!(store.list().len(), 1);
    assert!(store.get("does-not-exist").is_none());
    assert_eq!(stored_payload(&store), before);
}

#[test]
fn remove_deletes_and_persists_and_ignores_missing_ids() {
    let mut store = empty_store();
    let entity = store
        .upsert(Entity::new(EntityType::Note, "gone soon"))
        .into_entity();

    assert!(store.remove("missing").is_none());
    assert_eq!(store.list().len(), 1);

    let removed = store.remove(&entity.id).unwrap();
    assert_eq!(removed.id, entity.id);
    assert!(store.list().is_empty());

    let reloaded = EntityStore::open(MemoryKeyValueStorage::with_record(
        STORAGE_KEY,
        stored_payload(&store),
    ));
    assert!(reloaded.list().is_empty());
}

#[test]
fn load_falls_back_to_seed_when_record_is_absent_and_persists_it() {
    let store = EntityStore::open(MemoryKeyValueStorage::new());

    assert_eq!(store.list().len(), SEED_ENTITY_COUNT);
    let payload: serde_json::Value = serde_json::from_str(&stored_payload(&store)).unwrap();
    assert_eq!(payload["version"], SCHEMA_VERSION);
    assert_eq!(
        payload["entities"].as_array().unwrap().len(),
        SEED_ENTITY_COUNT
    );
}

#[test]
fn load_falls_back_to_seed_when_record_is_corrupt() {
    let storage = MemoryKeyValueStorage::with_record(STORAGE_KEY, "{not json");
    let store = EntityStore::open(storage);

    assert_eq!(store.list().len(), SEED_ENTITY_COUNT);
    assert!(serde_json::from_str::<serde_json::Value>(&stored_payload(&store)).is_ok());
}

#[test]
fn load_falls_back_to_seed_when_storage_read_fails() {
    let storage = FlakyStorage::default();
    storage.fail_reads.set(true);
    let store = EntityStore::open(storage);

    assert_eq!(store.list().len(), SEED_ENTITY_COUNT);
}

#[test]
fn load_treats_missing_entities_field_as_empty() {
    let storage = MemoryKeyValueStorage::with_record(STORAGE_KEY, r#"{"version":"1.0"}"#);
    let store = EntityStore::open(storage);
    assert!(store.list().is_empty());
}

#[test]
fn persist_after_load_is_byte_stable() {
    let mut store = EntityStore::open(MemoryKeyValueStorage::new());
    let seeded = stored_payload(&store);

    let mut reopened = EntityStore::open(MemoryKeyValueStorage::with_record(STORAGE_KEY, seeded));
    reopened.load();
    assert!(reopened.persist());
    let first = stored_payload(&reopened);

    reopened.load();
    assert!(reopened.persist());
    let second = stored_payload(&reopened);
    assert_eq!(first, second);

    store.load();
    assert_eq!(store.list(), reopened.list());
}

#[test]
fn persist_failure_keeps_in_memory_mutation() {
    let mut store = EntityStore::open(FlakyStorage::default());
    let before = store.list().len();
    store.storage().fail_writes.set(true);

    let created = store
        .upsert(Entity::new(EntityType::Task, "offline"))
        .into_entity();

    assert_eq!(store.list().len(), before + 1);
    assert!(store.get(&created.id).is_some());
    assert!(!store.persist());
    assert!(store.try_persist().is_err());
}

#[test]
fn sqlite_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orgspace.sqlite3");

    let created_id = {
        let conn = open_db(&path).unwrap();
        let storage = SqliteKeyValueStorage::try_new(&conn).unwrap();
        let mut store = EntityStore::open(storage);
        store
            .upsert(Entity::new(EntityType::Habit, "Stretch"))
            .into_entity()
            .id
    };

    let conn = open_db(&path).unwrap();
    let store = EntityStore::open(SqliteKeyValueStorage::try_new(&conn).unwrap());
    assert_eq!(store.list().len(), SEED_ENTITY_COUNT + 1);
    assert_eq!(store.get(&created_id).unwrap().kind, EntityType::Habit);
}

#[test]
fn independent_stores_do_not_share_state() {
    let conn_a = open_db_in_memory().unwrap();
    let conn_b = open_db_in_memory().unwrap();
    let mut store_a = EntityStore::open(SqliteKeyValueStorage::try_new(&conn_a).unwrap());
    let store_b = EntityStore::open(SqliteKeyValueStorage::try_new(&conn_b).unwrap());

    store_a.upsert(Entity::new(EntityType::Task, "only in a"));
    assert_eq!(store_a.list().len(), SEED_ENTITY_COUNT + 1);
    assert_eq!(store_b.list().len(), SEED_ENTITY_COUNT);
}

#[test]
fn import_replaces_whole_store() {
    let mut store = EntityStore::open(MemoryKeyValueStorage::new());
    let payload = r##"{
        "entities": [
            {"id": "n1", "type": "note", "title": "Imported", "status": "active",
             "priority": "low", "tags": ["x"], "color": "#fff",
             "createdAt": "2025-01-10T00:00:00.000Z"}
        ],
        "exportDate": "2025-03-01T12:00:00.000Z",
        "version": "1.0"
    }"##;

    let count = store.import_json(payload).unwrap();

    assert_eq!(count, 1);
    assert_eq!(store.list().len(), 1);
    assert_eq!(store.list()[0].id, "n1");
    assert!(stored_payload(&store).contains("\"n1\""));
}

#[test]
fn import_with_non_array_entities_is_rejected_and_store_unchanged() {
    let mut store = EntityStore::open(MemoryKeyValueStorage::new());
    let before = store.list().to_vec();
    let payload_before = stored_payload(&store);

    let err = store
        .import_json(r#"{"entities":"not-an-array"}"#)
        .unwrap_err();

    assert!(matches!(err, ImportError::MissingEntities));
    assert_eq!(store.list(), before.as_slice());
    assert_eq!(stored_payload(&store), payload_before);
}

#[test]
fn import_with_malformed_entity_is_rejected_whole() {
    let mut store = EntityStore::open(MemoryKeyValueStorage::new());
    let before = store.list().to_vec();

    let err = store
        .import_json(r#"{"entities":[{"id":"ok","type":"note","title":"t","status":"active","createdAt":"2025-01-01"},{"type":"bogus"}]}"#)
        .unwrap_err();

    assert!(matches!(err, ImportError::InvalidEntity { index: 1, .. }));
    assert_eq!(store.list(), before.as_slice());
}

#[test]
fn import_assigns_ids_to_blank_and_duplicate_entries() {
    let mut store = empty_store();
    let payload = r#"{"entities":[
        {"id":"dup","type":"task","title":"a","status":"active","createdAt":"2025-01-01"},
        {"id":"dup","type":"task","title":"b","status":"active","createdAt":"2025-01-02"},
        {"type":"task","title":"c","status":"active","createdAt":"2025-01-03"}
    ]}"#;

    store.import_json(payload).unwrap();

    let ids: HashSet<_> = store.list().iter().map(|entity| entity.id.clone()).collect();
    assert_eq!(ids.len(), 3);
    assert!(!ids.contains(""));
}

#[test]
fn export_then_import_restores_the_same_entities() {
    let source = EntityStore::open(MemoryKeyValueStorage::new());
    let snapshot = source.export_snapshot_at("2025-03-09T08:00:00Z".parse().unwrap());
    assert_eq!(snapshot.file_name(), "orgspace-export-2025-03-09.json");
    assert_eq!(snapshot.version, SCHEMA_VERSION);

    let json = snapshot.to_json().unwrap();
    assert!(json.contains("\n  \"entities\""));
    assert!(json.contains("\"exportDate\": \"2025-03-09T08:00:00.000Z\""));

    let mut target = empty_store();
    target.import_json(&json).unwrap();
    assert_eq!(target.list(), source.list());
}

#[test]
fn reset_checklist_unchecks_items_and_persists() {
    let mut store = empty_store();
    let mut routine = Entity::new(EntityType::Checklist, "Morning Routine");
    routine.checklist = orgspace_core::build_checklist(vec![
        RawChecklistItem::new("Wake up", true),
        RawChecklistItem::new("Drink water", true),
    ]);
    let routine = store.upsert(routine).into_entity();

    let reset = store.reset_checklist(&routine.id).unwrap();
    assert!(reset.checklist.iter().all(|item| !item.completed));
    assert_eq!(reset.checklist[0].id, routine.checklist[0].id);

    let reloaded = EntityStore::open(MemoryKeyValueStorage::with_record(
        STORAGE_KEY,
        stored_payload(&store),
    ));
    let persisted = reloaded.get(&routine.id).unwrap();
    assert!(persisted.checklist.iter().all(|item| !item.completed));

    assert!(store.reset_checklist("missing").is_none());
}

#[test]
fn replace_checklist_drops_blank_rows() {
    let mut store = empty_store();
    let project = store
        .upsert(Entity::new(EntityType::Project, "Launch"))
        .into_entity();

    let updated = store
        .replace_checklist(
            &project.id,
            vec![
                RawChecklistItem::new("  Draft plan ", true),
                RawChecklistItem::new("   ", false),
            ],
        )
        .unwrap();

    assert_eq!(updated.checklist.len(), 1);
    assert_eq!(updated.checklist[0].text, "Draft plan");
    assert!(updated.checklist[0].completed);
    assert_eq!(updated.created_at, project.created_at);
}

#[test]
fn export_json_carries_version_and_every_entity() {
    let store = EntityStore::open(MemoryKeyValueStorage::new());

    let json: serde_json::Value = serde_json::from_str(&store.export_json().unwrap()).unwrap();

    assert_eq!(json["version"], SCHEMA_VERSION);
    assert!(json["exportDate"].as_str().unwrap().ends_with('Z'));
    assert_eq!(json["entities"].as_array().unwrap().len(), SEED_ENTITY_COUNT);
}

#[test]
fn ids_assigned_on_load_are_persisted_and_stable_across_reopen() {
    let storage = MemoryKeyValueStorage::with_record(
        STORAGE_KEY,
        r#"{"entities":[{"id":"","type":"task","title":"t","status":"active","createdAt":"2025-01-01"}],"version":"1.0"}"#,
    );

    let first = EntityStore::open(&storage).list()[0].id.clone();
    let second = EntityStore::open(&storage).list()[0].id.clone();

    assert!(!first.is_empty());
    assert_eq!(first, second);
    let payload = storage.read(STORAGE_KEY).unwrap().unwrap();
    assert!(payload.contains(&format!("\"id\":\"{first}\"")));
    assert!(!payload.contains("\"id\":\"\""));
}

#[test]
fn load_treats_null_entities_as_empty_without_seeding() {
    let storage = MemoryKeyValueStorage::with_record(
        STORAGE_KEY,
        r#"{"entities":null,"version":"1.0"}"#,
    );
    let store = EntityStore::open(storage);
    assert!(store.list().is_empty());
}

#[test]
fn back_to_back_creates_keep_query_order_after_reload() {
    let mut store = empty_store();
    store.upsert(Entity::new(EntityType::Task, "older"));
    store.upsert(Entity::new(EntityType::Task, "newer"));
    let before: Vec<String> = store
        .query(View::Tasks, &EntityFilters::new())
        .iter()
        .map(|entity| entity.title.clone())
        .collect();

    let reloaded = EntityStore::open(MemoryKeyValueStorage::with_record(
        STORAGE_KEY,
        stored_payload(&store),
    ));
    let after: Vec<String> = reloaded
        .query(View::Tasks, &EntityFilters::new())
        .iter()
        .map(|entity| entity.title.clone())
        .collect();

    assert_eq!(before, after);
    assert_eq!(reloaded.list(), store.list());
}

#[test]
fn upsert_outcome_equals_the_reloaded_entity() {
    let mut store = empty_store();
    let mut entity = Entity::new(EntityType::Note, "precise");
    entity.created_at = "2025-05-05T10:00:00.123456789Z".parse().unwrap();
    let created = store.upsert(entity).into_entity();

    let reloaded = EntityStore::open(MemoryKeyValueStorage::with_record(
        STORAGE_KEY,
        stored_payload(&store),
    ));

    assert_eq!(reloaded.get(&created.id), Some(&created));
}
