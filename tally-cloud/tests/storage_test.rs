use {
    serde_json::json,
    tally_core::Record,
    tally_cloud::{
        storage::{KVStorage, MemoryStorage, NamespacedStorage, SqliteStorage, StorageError, WithKey},
        table::{KvTable, Table, WithRecord},
    },
};

#[test]
fn memory_storage_roundtrip() {
    let storage = MemoryStorage::new();
    assert!(storage.get(b"key").unwrap().is_none());

    storage.set(b"key", b"value").unwrap();
    assert_eq!(Some(b"value".to_vec()), storage.get(b"key").unwrap());
}

#[test]
fn memory_storage_overwrites() {
    let storage = MemoryStorage::new()
        .with_key(b"key", b"first").unwrap()
        .with_key(b"key", b"second").unwrap();
    assert_eq!(Some(b"second".to_vec()), storage.get(b"key").unwrap());
}

#[test]
fn sqlite_storage_roundtrip() {
    let storage = SqliteStorage::in_memory().unwrap();
    assert!(storage.get(b"key").unwrap().is_none());

    storage.set(b"key", b"value").unwrap();
    assert_eq!(Some(b"value".to_vec()), storage.get(b"key").unwrap());

    storage.set(b"key", b"replaced").unwrap();
    assert_eq!(Some(b"replaced".to_vec()), storage.get(b"key").unwrap());
}

#[test]
fn namespaced_storage_prefixes_keys() {
    let backing = MemoryStorage::new();
    let namespaced = NamespacedStorage::new("table-a", backing.clone());

    namespaced.set(b"key", b"value").unwrap();

    assert_eq!(Some(b"value".to_vec()), namespaced.get(b"key").unwrap());
    assert_eq!(Some(b"value".to_vec()), backing.get(b"table-a/key").unwrap());
    assert!(backing.get(b"key").unwrap().is_none());
}

#[test]
fn namespaced_storages_are_isolated() {
    let backing = MemoryStorage::new();
    let table_a = NamespacedStorage::new("table-a", backing.clone());
    let table_b = NamespacedStorage::new("table-b", backing);

    table_a.set(b"key", b"a").unwrap();
    table_b.set(b"key", b"b").unwrap();

    assert_eq!(Some(b"a".to_vec()), table_a.get(b"key").unwrap());
    assert_eq!(Some(b"b".to_vec()), table_b.get(b"key").unwrap());
}

#[test]
fn kv_table_roundtrip() {
    let table = KvTable::new(MemoryStorage::new());
    assert!(table.get("some-record").unwrap().is_none());

    let record = Record::new()
        .with_field("id", "some-record")
        .with_field("count", 42);
    table.put(&record).unwrap();

    assert_eq!(Some(record), table.get("some-record").unwrap());
}

#[test]
fn kv_table_update_sets_a_single_field() {
    let table = KvTable::new(MemoryStorage::new())
        .with_record(
            &Record::new()
                .with_field("id", "some-record")
                .with_field("count", 10)
                .with_field("label", "visits")
        ).unwrap();

    table.update("some-record", "count", json!(11)).unwrap();

    let updated = table.get("some-record").unwrap().unwrap();
    assert_eq!(Some(&json!(11)), updated.field("count"));
    // untouched fields survive the update
    assert_eq!(Some(&json!("visits")), updated.field("label"));
}

#[test]
fn kv_table_update_of_missing_record_fails() {
    let table = KvTable::new(MemoryStorage::new());

    match table.update("missing", "count", json!(1)) {
        Err(StorageError::KeyConstraintError { description: _ }) => {},
        other => panic!("expected key constraint error, got: {other:?}"),
    }
}

#[test]
fn kv_table_rejects_record_without_id() {
    let table = KvTable::new(MemoryStorage::new());

    match table.put(&Record::new().with_field("count", 1)) {
        Err(StorageError::KeyConstraintError { description: _ }) => {},
        other => panic!("expected key constraint error, got: {other:?}"),
    }
}

#[test]
fn kv_table_surfaces_corrupted_records() {
    let storage = MemoryStorage::new()
        .with_key(b"some-record", b"not json").unwrap();
    let table = KvTable::new(storage);

    match table.get("some-record") {
        Err(StorageError::InternalError { description: _ }) => {},
        other => panic!("expected internal error, got: {other:?}"),
    }
}
