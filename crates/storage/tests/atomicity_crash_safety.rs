#![forbid(unsafe_code)]

use ks_core::{FieldPicks, Handle, Note, NoteRef, Person, Record, RecordKind, Source, SourceRef};
use ks_storage::{MergeRequest, SqliteStore, StoreError};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

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

const REFERRERS: usize = 6;

fn seed(storage_dir: &Path) {
    let mut store = SqliteStore::open(storage_dir).expect("open store");
    let mut records: Vec<Record> = vec![
        Source::new("Parish Register A").with_handle(h("s1")).into(),
        Source::new("Parish Register A (copy)").with_handle(h("s2")).into(),
    ];
    for i in 1..=REFERRERS {
        let handle = format!("p{i}");
        let mut person = Person::named("Test", &handle).with_handle(h(&handle));
        person.source_refs.push(SourceRef::new(h("s2")));
        records.push(person.into());
    }
    store.import(records).expect("import");
}

/// Makes every write to `p3` fail, i.e. the third of six referrer commits.
fn inject_failure(storage_dir: &Path) {
    let conn = Connection::open(storage_dir.join("kinship.db")).expect("open raw db");
    conn.execute_batch(
        r#"
        CREATE TRIGGER fail_on_p3 BEFORE UPDATE ON records
        WHEN NEW.handle = 'p3'
        BEGIN
          SELECT RAISE(ABORT, 'simulated storage failure');
        END;
        "#,
    )
    .expect("install trigger");
}

fn citations(store: &SqliteStore, target: &str) -> usize {
    store
        .find_referrers(RecordKind::Source, &h(target))
        .collect::<Result<Vec<_>, _>>()
        .expect("scan")
        .len()
}

#[test]
fn merge_rolls_back_when_a_referrer_commit_fails() {
    let storage_dir = temp_dir("merge_rolls_back_when_a_referrer_commit_fails");
    seed(&storage_dir);
    inject_failure(&storage_dir);

    let mut store = SqliteStore::open(&storage_dir).expect("reopen store");
    let err = store
        .merge(MergeRequest {
            kind: RecordKind::Source,
            survivor: h("s1"),
            donor: h("s2"),
            picks: FieldPicks::new(),
        })
        .expect_err("merge must fail");
    match err {
        StoreError::Sql(err) => assert!(
            err.to_string().contains("simulated storage failure"),
            "{err}"
        ),
        other => panic!("unexpected error {other}"),
    }

    assert_eq!(citations(&store, "s1"), 0);
    assert_eq!(citations(&store, "s2"), REFERRERS);
    assert!(
        store
            .get(RecordKind::Source, &h("s2"))
            .expect("get")
            .is_some()
    );
    let log = store.txn_log(10).expect("log");
    assert_eq!(log.len(), 1);
    assert!(log[0].description.starts_with("import"));
}

#[test]
fn state_survives_reopen_after_failed_merge() {
    let storage_dir = temp_dir("state_survives_reopen_after_failed_merge");
    seed(&storage_dir);
    inject_failure(&storage_dir);

    {
        let mut store = SqliteStore::open(&storage_dir).expect("open store");
        let _ = store.merge(MergeRequest {
            kind: RecordKind::Source,
            survivor: h("s1"),
            donor: h("s2"),
            picks: FieldPicks::new(),
        });
    }

    let conn = Connection::open(storage_dir.join("kinship.db")).expect("open raw db");
    conn.execute_batch("DROP TRIGGER fail_on_p3;")
        .expect("drop trigger");
    drop(conn);

    let mut store = SqliteStore::open(&storage_dir).expect("reopen store");
    assert_eq!(citations(&store, "s2"), REFERRERS);
    let outcome = store
        .merge(MergeRequest {
            kind: RecordKind::Source,
            survivor: h("s1"),
            donor: h("s2"),
            picks: FieldPicks::new(),
        })
        .expect("merge after repair");
    assert_eq!(outcome.rewritten, REFERRERS);
    assert_eq!(citations(&store, "s1"), REFERRERS);
}

#[test]
fn dropped_transaction_rolls_back() {
    let mut store = SqliteStore::open_in_memory().expect("open store");
    {
        let mut txn = store.begin().expect("begin");
        let mut note = Note::new("draft").with_handle(h("n1"));
        note.header.private = true;
        txn.add(note.into()).expect("add");
        let mut source = Source::new("Draft").with_handle(h("s1"));
        source.notes.push(NoteRef(h("n1")));
        txn.add(source.into()).expect("add");
    }
    assert_eq!(store.count(RecordKind::Note).expect("count"), 0);
    assert_eq!(store.count(RecordKind::Source).expect("count"), 0);
    assert!(store.txn_log(10).expect("log").is_empty());
}

#[test]
fn explicit_rollback_discards_rewrites() {
    let storage_dir = temp_dir("explicit_rollback_discards_rewrites");
    seed(&storage_dir);
    let mut store = SqliteStore::open(&storage_dir).expect("open store");

    let mut txn = store.begin().expect("begin");
    let rewritten = txn
        .rewrite_references(RecordKind::Source, &h("s2"), &h("s1"))
        .expect("rewrite");
    assert_eq!(rewritten, REFERRERS);
    txn.rollback().expect("rollback");

    assert_eq!(citations(&store, "s1"), 0);
    assert_eq!(citations(&store, "s2"), REFERRERS);
}
