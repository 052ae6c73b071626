//! Integration tests for Localstore

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use base64::{engine::general_purpose, Engine as _};
use localstore::{
    Container, Getter, LocalStore, LocalStoreError, MemoryStorage, Options, StateStore,
    StorageBackend,
};
use serde_json::{json, Value};

fn container(value: Value) -> Container {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn setup(options: Options) -> (LocalStore, Arc<MemoryStorage>) {
    let store = StateStore::new();
    let storage = Arc::new(MemoryStorage::new());
    let adapter = LocalStore::register(&store, storage.clone(), options).unwrap();
    (adapter, storage)
}

#[test]
fn round_trip_without_transform() {
    let seed = container(json!({"a": 1, "b": "two", "c": [1, 2, 3]}));
    let (adapter, storage) = setup(Options {
        state: Some(seed.clone()),
        ..Options::default()
    });

    adapter.init().unwrap();

    // What went to storage parses back to exactly the seed
    let raw = storage.get_item("store").unwrap().unwrap();
    let parsed: Container = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed, seed);

    // And a fresh adapter loading it ends up with the same container
    let store = StateStore::new();
    let reloaded = LocalStore::register(&store, storage, Options::default()).unwrap();
    reloaded.init().unwrap();
    assert_eq!(reloaded.module().snapshot(), seed);
}

#[test]
fn round_trip_with_transform() {
    let seed = container(json!({"a": 1, "nested": {"x": true}}));
    let (adapter, storage) = setup(Options {
        encode: true,
        state: Some(seed.clone()),
        ..Options::default()
    });

    adapter.init().unwrap();

    let store = StateStore::new();
    let reloaded = LocalStore::register(
        &store,
        storage,
        Options {
            encode: true,
            ..Options::default()
        },
    )
    .unwrap();
    reloaded.init().unwrap();
    assert_eq!(reloaded.module().snapshot(), seed);
}

#[test]
fn merge_precedence_blob_wins() {
    let (adapter, storage) = setup(Options {
        state: Some(container(json!({"a": 1, "b": 2}))),
        ..Options::default()
    });
    storage.set_item("store", r#"{"b":3}"#).unwrap();

    adapter.init().unwrap();

    assert_eq!(adapter.module().snapshot(), container(json!({"a": 1, "b": 3})));
}

#[test]
fn expired_blob_is_discarded_whole() {
    let (adapter, storage) = setup(Options {
        state: Some(container(json!({"a": 1}))),
        ..Options::default()
    });
    // Stamp far in the past
    storage.set_item("store", r#"{"a":9,"expire":1}"#).unwrap();

    adapter.init().unwrap();

    assert_eq!(adapter.module().snapshot(), container(json!({"a": 1})));
}

#[test]
fn edit_propagates_to_memory_and_storage() {
    let (adapter, storage) = setup(Options::default());
    adapter.init().unwrap();

    adapter.edit("x", json!(42)).unwrap();

    assert_eq!(adapter.module().get("x"), Some(json!(42)));
    let raw = storage.get_item("store").unwrap().unwrap();
    let parsed: Container = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.get("x"), Some(&json!(42)));
}

#[test]
fn transform_toggling() {
    // encode = false: the stored blob is directly valid JSON
    let (adapter, storage) = setup(Options::default());
    adapter.edit("k", json!("v")).unwrap();
    let raw = storage.get_item("store").unwrap().unwrap();
    assert!(serde_json::from_str::<Value>(&raw).is_ok());

    // encode = true: not valid JSON as stored, valid after reversal
    let (adapter, storage) = setup(Options {
        encode: true,
        ..Options::default()
    });
    adapter.edit("k", json!("v")).unwrap();
    let raw = storage.get_item("store").unwrap().unwrap();
    assert!(serde_json::from_str::<Value>(&raw).is_err());

    let bytes = general_purpose::STANDARD.decode(&raw).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let parsed: Container = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed.get("k"), Some(&json!("v")));
}

#[test]
fn corrupt_blob_fails_initialization() {
    let (adapter, storage) = setup(Options::default());
    storage.set_item("store", "!! not json, not base64 !!").unwrap();

    let err = adapter.init().unwrap_err();
    assert!(matches!(err, LocalStoreError::Blob(_)));

    // The corrupt blob is left in place; no fallback persist happened
    assert_eq!(
        storage.get_item("store").unwrap().as_deref(),
        Some("!! not json, not base64 !!")
    );
}

#[test]
fn missing_blob_persists_defaults() {
    let (adapter, storage) = setup(Options {
        state: Some(container(json!({"a": 1}))),
        ..Options::default()
    });
    assert_eq!(storage.get_item("store").unwrap(), None);

    adapter.init().unwrap();

    let raw = storage.get_item("store").unwrap().unwrap();
    let parsed: Container = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed, container(json!({"a": 1})));
}

#[test]
fn configured_keys_are_honored() {
    let store = StateStore::new();
    let storage = Arc::new(MemoryStorage::new());
    let adapter = LocalStore::register(
        &store,
        storage.clone(),
        Options {
            state_key: Some("session".to_string()),
            storage_key: Some("app.session".to_string()),
            ..Options::default()
        },
    )
    .unwrap();

    assert!(store.module("session").is_some());
    assert!(store.module("$ls").is_none());

    adapter.edit("user", json!("mori")).unwrap();
    assert!(storage.get_item("app.session").unwrap().is_some());
    assert_eq!(storage.get_item("store").unwrap(), None);
}

#[test]
fn getters_pass_through() {
    let mut getters: std::collections::HashMap<String, Getter> = std::collections::HashMap::new();
    getters.insert(
        "loud_name".to_string(),
        Arc::new(|state: &Container| {
            json!(state
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_uppercase())
        }),
    );

    let (adapter, _storage) = setup(Options {
        state: Some(container(json!({"name": "quiet"}))),
        getters,
        ..Options::default()
    });

    assert_eq!(adapter.module().getter("loud_name"), Some(json!("QUIET")));

    adapter.edit("name", json!("louder")).unwrap();
    assert_eq!(adapter.module().getter("loud_name"), Some(json!("LOUDER")));
}

#[test]
fn subscribers_see_every_edit() {
    let (adapter, _storage) = setup(Options::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();

    adapter.module().subscribe(move |_| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
    });

    adapter.edit("a", json!(1)).unwrap();
    adapter.edit("b", json!(2)).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn binding_two_way() {
    let (adapter, storage) = setup(Options {
        state: Some(container(json!({"theme": "light"}))),
        ..Options::default()
    });
    adapter.init().unwrap();

    let theme = adapter.bind("theme");
    assert_eq!(theme.get(), Some(json!("light")));

    theme.set(json!("dark")).unwrap();
    assert_eq!(adapter.module().get("theme"), Some(json!("dark")));

    let raw = storage.get_item("store").unwrap().unwrap();
    let parsed: Container = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.get("theme"), Some(&json!("dark")));
}
