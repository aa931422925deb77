#![forbid(unsafe_code)]

use ks_core::{Handle, Media, Note, Person, Record, RecordKind, Source};
use ks_storage::{JournalMode, SqliteStore, StoreConfig, StoreError};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("ks_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn h(raw: &str) -> Handle {
    Handle::try_new(raw).expect("handle")
}

#[test]
fn add_assigns_gramps_ids_per_kind_and_skips_taken_ones() {
    let mut store = SqliteStore::open_in_memory().expect("open store");
    let mut imported = Source::new("Imported").with_handle(h("s_imported"));
    imported.header.gramps_id = "S0001".to_string();

    let stored = store
        .import(vec![
            imported.into(),
            Source::new("Fresh").with_handle(h("s_fresh")).into(),
            Note::new("hello").with_handle(h("n1")).into(),
            Person::named("Anna", "Berg").with_handle(h("p1")).into(),
        ])
        .expect("import");

    let ids: Vec<&str> = stored.iter().map(Record::gramps_id).collect();
    assert_eq!(ids, vec!["S0001", "S0002", "N0001", "I0001"]);
    assert!(stored.iter().all(|record| record.header().change_ms > 0));
}

#[test]
fn handles_are_listed_in_ascending_order() {
    let mut store = SqliteStore::open_in_memory().expect("open store");
    store
        .import(vec![
            Media::new("c.jpg").with_handle(h("m3")).into(),
            Media::new("a.jpg").with_handle(h("m1")).into(),
            Media::new("b.jpg").with_handle(h("m2")).into(),
        ])
        .expect("import");
    assert_eq!(
        store.handles(RecordKind::Media).expect("handles"),
        vec![h("m1"), h("m2"), h("m3")]
    );
    assert_eq!(store.count(RecordKind::Media).expect("count"), 3);
    assert!(store.handles(RecordKind::Note).expect("handles").is_empty());
}

#[test]
fn duplicate_handles_and_gramps_ids_are_rejected() {
    let mut store = SqliteStore::open_in_memory().expect("open store");
    store
        .import(vec![Source::new("A").with_handle(h("x1")).into()])
        .expect("import");

    let err = store
        .import(vec![Note::new("clash").with_handle(h("x1")).into()])
        .expect_err("handle clash");
    match err {
        StoreError::AlreadyExists { kind, handle } => {
            assert_eq!(kind, RecordKind::Source);
            assert_eq!(handle, h("x1"));
        }
        other => panic!("unexpected error {other}"),
    }

    let mut twin = Source::new("B").with_handle(h("x2"));
    twin.header.gramps_id = "S0001".to_string();
    let err = store.import(vec![twin.into()]).expect_err("gramps id clash");
    assert!(matches!(err, StoreError::InvalidInput(_)), "{err}");
    assert_eq!(store.count(RecordKind::Source).expect("count"), 1);
}

#[test]
fn put_and_remove_require_an_existing_record() {
    let mut store = SqliteStore::open_in_memory().expect("open store");
    let mut txn = store.begin().expect("begin");
    let mut ghost: Record = Source::new("Ghost").with_handle(h("s404")).into();
    match txn.put(&mut ghost).expect_err("put unknown") {
        StoreError::UnknownId { kind, handle } => {
            assert_eq!(kind, RecordKind::Source);
            assert_eq!(handle, h("s404"));
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(matches!(
        txn.remove(RecordKind::Source, &h("s404")),
        Err(StoreError::UnknownId { .. })
    ));

    let mut stored = txn
        .add(Source::new("Real").with_handle(h("s1")).into())
        .expect("add");
    // Same handle, wrong kind: not found.
    assert!(txn.get(RecordKind::Note, &h("s1")).expect("get").is_none());
    if let Record::Source(source) = &mut stored {
        source.author = "Lund".to_string();
    }
    txn.put(&mut stored).expect("put");
    txn.commit("add and edit s1").expect("commit");

    match store.get(RecordKind::Source, &h("s1")).expect("get") {
        Some(Record::Source(source)) => assert_eq!(source.author, "Lund"),
        other => panic!("unexpected record {other:?}"),
    }
}

#[test]
fn commits_are_logged_newest_first() {
    let mut store = SqliteStore::open_in_memory().expect("open store");
    store
        .import(vec![Note::new("one").with_handle(h("n1")).into()])
        .expect("import");

    let mut txn = store.begin().expect("begin");
    txn.remove(RecordKind::Note, &h("n1")).expect("remove");
    let entry = txn.commit("  drop n1  ").expect("commit");
    assert_eq!(entry.description, "drop n1");
    assert_eq!(entry.changes, 1);

    let log = store.txn_log(10).expect("log");
    let descriptions: Vec<&str> = log.iter().map(|e| e.description.as_str()).collect();
    assert_eq!(descriptions, vec!["drop n1", "import 1 records"]);
    assert!(log[0].seq > log[1].seq);
    assert_eq!(store.txn_log(1).expect("log").len(), 1);

    let txn = store.begin().expect("begin");
    assert!(matches!(
        txn.commit("   "),
        Err(StoreError::InvalidInput(_))
    ));
}

#[test]
fn missing_config_file_uses_defaults() {
    let storage_dir = temp_dir("missing_config_file_uses_defaults");
    let config = StoreConfig::load(&storage_dir).expect("load config");
    assert_eq!(config, StoreConfig::default());
    assert_eq!(config.busy_timeout_ms, 5_000);
    assert!(config.foreign_keys);
    assert_eq!(config.journal_mode, JournalMode::Wal);
    assert_eq!(config.db_file, "kinship.db");

    SqliteStore::open(&storage_dir).expect("open store");
    assert!(storage_dir.join("kinship.db").exists());
}

#[test]
fn config_file_overrides_defaults() {
    let storage_dir = temp_dir("config_file_overrides_defaults");
    std::fs::write(
        storage_dir.join("kinship.toml"),
        "busy_timeout_ms = 250\njournal_mode = \"DELETE\"\ndb_file = \"tree.db\"\n",
    )
    .expect("write config");

    let config = StoreConfig::load(&storage_dir).expect("load config");
    assert_eq!(config.busy_timeout_ms, 250);
    assert_eq!(config.journal_mode, JournalMode::Delete);
    assert!(config.foreign_keys);

    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    store
        .import(vec![Note::new("persisted").with_handle(h("n1")).into()])
        .expect("import");
    drop(store);
    assert!(storage_dir.join("tree.db").exists());

    let store = SqliteStore::open(&storage_dir).expect("reopen store");
    assert_eq!(store.count(RecordKind::Note).expect("count"), 1);
}

#[test]
fn malformed_config_is_reported() {
    let storage_dir = temp_dir("malformed_config_is_reported");
    std::fs::write(storage_dir.join("kinship.toml"), "journal_mode = \"SIDEWAYS\"\n")
        .expect("write config");
    assert!(matches!(
        SqliteStore::open(&storage_dir),
        Err(StoreError::Config(_))
    ));
}
