//! End-to-end connection-string flows through the registry.

#![allow(clippy::expect_used, clippy::panic)]

use polystore_storage::{ConnectionDescriptor, Query, StoreError, StoreRegistry};

#[tokio::test]
async fn file_connection_string_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = StoreRegistry::new(true);

    let connection = format!("file://{}?pathmapped=true", dir.path().display());
    let store = registry.create(&connection).await.expect("create");

    store.write("reports/2026/q1", "totals").await.expect("write");
    assert!(dir.path().join("reports").join("2026").join("q1").is_file());

    let entries = store.enumerate(Query::with_prefix("reports/")).collect().await.expect("list");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, "reports/2026/q1");
}

#[tokio::test]
async fn memory_and_file_share_one_contract() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = StoreRegistry::new(true);

    for connection in
        ["memory://scratch".to_owned(), format!("file://{}", dir.path().display())]
    {
        let store = registry.create(&connection).await.expect("create");
        store.write("k1", "v").await.expect("write");
        store.write("k2", "v").await.expect("write");
        store.write("a3", "v").await.expect("write");

        let entries = store.enumerate(Query::with_prefix("k")).collect().await.expect("list");
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["k1", "k2"], "{connection}");
    }
}

#[tokio::test]
async fn sandboxed_registry_resolves_nothing() {
    let registry = StoreRegistry::new(false);
    for connection in ["memory://x", "file://tmp"] {
        let err = registry.create(connection).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownScheme { .. }), "{connection}");
    }
}

#[tokio::test]
async fn configuration_errors_fail_before_backend_io() {
    let registry = StoreRegistry::new(true);

    // Blank path: rejected by the factory before any filesystem access.
    let err = registry.create("file://?pathmapped=true").await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidOption { ref name, .. } if name == "path"));

    // Bad option value: same.
    let err = registry.create("file://somewhere?create=perhaps").await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidOption { ref name, .. } if name == "create"));
}

#[test]
fn descriptor_scenario_from_the_wire_format() {
    let d = ConnectionDescriptor::parse("file://data?pathmapped=true");
    assert_eq!(d.scheme(), "file");
    assert_eq!(d.path(), "data");
    assert_eq!(d.option("pathmapped"), Some("true"));
}

#[test]
fn discovery_lists_schemes_and_options() {
    let registry = StoreRegistry::new(true);
    assert_eq!(registry.schemes(), vec!["file", "memory"]);

    let file_options = registry.options_for("file").expect("file registered");
    let names: Vec<&str> = file_options.iter().map(|spec| spec.name).collect();
    assert_eq!(names, vec!["pathmapped", "create"]);
    assert!(file_options.iter().all(|spec| !spec.required));
}
