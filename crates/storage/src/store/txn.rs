#![forbid(unsafe_code)]

use super::support::*;
use super::{Referrers, StoreError, TxnLogEntry};
use ks_core::{Handle, Record, RecordKind};
use rusqlite::{OptionalExtension, Transaction, params};

/// One unit of work against the store.
///
/// Nothing is visible to other connections until [`StoreTxn::commit`]. Dropping
/// the value without committing rolls every change back.
#[derive(Debug)]
pub struct StoreTxn<'conn> {
    tx: Transaction<'conn>,
    changes: usize,
}

impl<'conn> StoreTxn<'conn> {
    pub(super) fn new(tx: Transaction<'conn>) -> Self {
        Self { tx, changes: 0 }
    }

    /// Inserts a new record. A blank gramps id is replaced by the next free one
    /// for the record's kind. Returns the record as stored.
    pub fn add(&mut self, mut record: Record) -> Result<Record, StoreError> {
        let kind = record.kind();
        let existing: Option<String> = self
            .tx
            .query_row(
                "SELECT kind FROM records WHERE handle=?1",
                params![record.handle().as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(existing) = existing {
            let kind = existing
                .parse::<RecordKind>()
                .map_err(|_| StoreError::InvalidInput("unknown kind stored"))?;
            return Err(StoreError::AlreadyExists {
                kind,
                handle: record.handle().clone(),
            });
        }

        if record.gramps_id().trim().is_empty() {
            record.header_mut().gramps_id = next_gramps_id_tx(&self.tx, kind)?;
        }
        record.header_mut().change_ms = now_ms();

        let body = serde_json::to_string(&record)?;
        let header = record.header();
        self.tx
            .execute(
                "INSERT INTO records(kind, handle, gramps_id, change_ms, private, body_json) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    kind.as_str(),
                    header.handle.as_str(),
                    header.gramps_id,
                    header.change_ms,
                    header.private,
                    body,
                ],
            )
            .map_err(map_gramps_id_conflict)?;
        self.changes += 1;
        Ok(record)
    }

    pub fn get(&self, kind: RecordKind, handle: &Handle) -> Result<Option<Record>, StoreError> {
        load_record_tx(&self.tx, kind, handle)
    }

    /// Like [`StoreTxn::get`], but a missing record is an error.
    pub fn require(&self, kind: RecordKind, handle: &Handle) -> Result<Record, StoreError> {
        self.get(kind, handle)?.ok_or_else(|| StoreError::UnknownId {
            kind,
            handle: handle.clone(),
        })
    }

    /// Writes back a mutated record and stamps its change time.
    pub fn put(&mut self, record: &mut Record) -> Result<(), StoreError> {
        let kind = record.kind();
        record.header_mut().change_ms = now_ms();
        let body = serde_json::to_string(&*record)?;
        let header = record.header();
        let updated = self
            .tx
            .execute(
                "UPDATE records SET gramps_id=?3, change_ms=?4, private=?5, body_json=?6 \
                 WHERE kind=?1 AND handle=?2",
                params![
                    kind.as_str(),
                    header.handle.as_str(),
                    header.gramps_id,
                    header.change_ms,
                    header.private,
                    body,
                ],
            )
            .map_err(map_gramps_id_conflict)?;
        if updated == 0 {
            return Err(StoreError::UnknownId {
                kind,
                handle: header.handle.clone(),
            });
        }
        self.changes += 1;
        Ok(())
    }

    pub fn remove(&mut self, kind: RecordKind, handle: &Handle) -> Result<(), StoreError> {
        let deleted = self.tx.execute(
            "DELETE FROM records WHERE kind=?1 AND handle=?2",
            params![kind.as_str(), handle.as_str()],
        )?;
        if deleted == 0 {
            return Err(StoreError::UnknownId {
                kind,
                handle: handle.clone(),
            });
        }
        self.changes += 1;
        Ok(())
    }

    /// Handles of every record of `kind`, ascending.
    pub fn handles(&self, kind: RecordKind) -> Result<Vec<Handle>, StoreError> {
        handles_tx(&self.tx, kind)
    }

    pub fn find_referrers(&self, kind: RecordKind, handle: &Handle) -> Referrers<'_> {
        Referrers::new(&self.tx, kind, handle.clone())
    }

    /// Row writes made so far in this transaction.
    pub fn changes(&self) -> usize {
        self.changes
    }

    pub fn commit(self, description: &str) -> Result<TxnLogEntry, StoreError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(StoreError::InvalidInput("transaction description must not be empty"));
        }
        let ts_ms = now_ms();
        let changes = i64::try_from(self.changes)
            .map_err(|_| StoreError::InvalidInput("numeric overflow"))?;
        self.tx.execute(
            "INSERT INTO txn_log(ts_ms, description, changes) VALUES (?1, ?2, ?3)",
            params![ts_ms, description, changes],
        )?;
        let seq = self.tx.last_insert_rowid();
        self.tx.commit()?;
        Ok(TxnLogEntry {
            seq,
            ts_ms,
            description: description.to_string(),
            changes: self.changes,
        })
    }

    pub fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback()?;
        Ok(())
    }
}

fn map_gramps_id_conflict(err: rusqlite::Error) -> StoreError {
    if is_unique_violation(&err) {
        return StoreError::InvalidInput("gramps_id already in use");
    }
    StoreError::Sql(err)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || message
                    .as_deref()
                    .is_some_and(|value| value.contains("UNIQUE constraint failed"))
        }
        _ => false,
    }
}
