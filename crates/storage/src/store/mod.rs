#![forbid(unsafe_code)]

mod backlinks;
mod config;
mod delete;
mod error;
mod merge;
mod requests;
mod support;
mod txn;

pub use backlinks::Referrers;
pub use config::{CONFIG_FILE, JournalMode, StoreConfig};
pub use error::StoreError;
pub use requests::*;
pub use txn::StoreTxn;

use ks_core::{Handle, Record, RecordKind};
use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};
use std::time::Duration;
use support::*;

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens (creating if needed) the store under `storage_dir`, reading
    /// `kinship.toml` from the same directory when present.
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref();
        std::fs::create_dir_all(storage_dir)?;
        let config = StoreConfig::load(storage_dir)?;
        Self::open_with(storage_dir, &config)
    }

    pub fn open_with(
        storage_dir: impl AsRef<Path>,
        config: &StoreConfig,
    ) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let conn = Connection::open(storage_dir.join(&config.db_file))?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        conn.execute_batch(&config.pragmas_sql())?;
        migrate_sqlite_schema(&conn)?;

        Ok(Self {
            conn,
            storage_dir: Some(storage_dir),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrate_sqlite_schema(&conn)?;
        Ok(Self {
            conn,
            storage_dir: None,
        })
    }

    /// `None` for in-memory stores.
    pub fn storage_dir(&self) -> Option<&Path> {
        self.storage_dir.as_deref()
    }

    pub fn begin(&mut self) -> Result<StoreTxn<'_>, StoreError> {
        Ok(StoreTxn::new(self.conn.transaction()?))
    }

    /// Adds every record in one transaction.
    pub fn import(&mut self, records: Vec<Record>) -> Result<Vec<Record>, StoreError> {
        if records.is_empty() {
            return Err(StoreError::InvalidInput("nothing to import"));
        }
        let mut txn = self.begin()?;
        let mut stored = Vec::with_capacity(records.len());
        for record in records {
            stored.push(txn.add(record)?);
        }
        let log = txn.commit(&format!("import {} records", stored.len()))?;
        tracing::info!(seq = log.seq, count = stored.len(), "imported records");
        Ok(stored)
    }

    pub fn get(&self, kind: RecordKind, handle: &Handle) -> Result<Option<Record>, StoreError> {
        load_record_tx(&self.conn, kind, handle)
    }

    pub fn handles(&self, kind: RecordKind) -> Result<Vec<Handle>, StoreError> {
        handles_tx(&self.conn, kind)
    }

    pub fn count(&self, kind: RecordKind) -> Result<usize, StoreError> {
        count_tx(&self.conn, kind)
    }

    pub fn find_referrers(&self, kind: RecordKind, handle: &Handle) -> Referrers<'_> {
        Referrers::new(&self.conn, kind, handle.clone())
    }

    /// Most recent entries first.
    pub fn txn_log(&self, limit: usize) -> Result<Vec<TxnLogEntry>, StoreError> {
        let limit = i64::try_from(limit).map_err(|_| StoreError::InvalidInput("numeric overflow"))?;
        let mut stmt = self.conn.prepare(
            "SELECT seq, ts_ms, description, changes FROM txn_log ORDER BY seq DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (seq, ts_ms, description, changes) = row?;
            out.push(TxnLogEntry {
                seq,
                ts_ms,
                description,
                changes: usize::try_from(changes)
                    .map_err(|_| StoreError::InvalidInput("negative change count"))?,
            });
        }
        Ok(out)
    }
}
