#![forbid(unsafe_code)]

use super::super::StoreError;
use ks_core::{Handle, Record, RecordKind};
use rusqlite::{Connection, OptionalExtension, params};

pub(in crate::store) fn decode_record(kind: RecordKind, body_json: &str) -> Result<Record, StoreError> {
    let record: Record = serde_json::from_str(body_json)?;
    if record.kind() != kind {
        return Err(StoreError::KindMismatch {
            expected: kind,
            actual: record.kind(),
        });
    }
    Ok(record)
}

pub(in crate::store) fn load_record_tx(
    conn: &Connection,
    kind: RecordKind,
    handle: &Handle,
) -> Result<Option<Record>, StoreError> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body_json FROM records WHERE kind=?1 AND handle=?2",
            params![kind.as_str(), handle.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    body.map(|raw| decode_record(kind, &raw)).transpose()
}

pub(in crate::store) fn handles_tx(
    conn: &Connection,
    kind: RecordKind,
) -> Result<Vec<Handle>, StoreError> {
    let mut stmt = conn.prepare("SELECT handle FROM records WHERE kind=?1 ORDER BY handle ASC")?;
    let rows = stmt.query_map(params![kind.as_str()], |row| row.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(Handle::try_new(row?)?);
    }
    Ok(out)
}

pub(in crate::store) fn count_tx(conn: &Connection, kind: RecordKind) -> Result<usize, StoreError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM records WHERE kind=?1",
        params![kind.as_str()],
        |row| row.get(0),
    )?;
    usize::try_from(count).map_err(|_| StoreError::InvalidInput("negative row count"))
}
