#![forbid(unsafe_code)]

use super::super::StoreError;
use ks_core::RecordKind;
use rusqlite::{Connection, OptionalExtension, params};

pub(in crate::store) fn next_counter_tx(conn: &Connection, name: &str) -> Result<i64, StoreError> {
    let current: i64 = conn
        .query_row(
            "SELECT value FROM counters WHERE name=?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or(0);
    let next = current + 1;
    conn.execute(
        r#"
        INSERT INTO counters(name, value) VALUES (?1, ?2)
        ON CONFLICT(name) DO UPDATE SET value=excluded.value
        "#,
        params![name, next],
    )?;
    Ok(next)
}

/// Next free human id for `kind`. Skips values already taken by imported ids.
pub(in crate::store) fn next_gramps_id_tx(
    conn: &Connection,
    kind: RecordKind,
) -> Result<String, StoreError> {
    let counter = format!("gramps_id:{}", kind.as_str());
    loop {
        let candidate = kind.format_gramps_id(next_counter_tx(conn, &counter)?);
        let taken: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM records WHERE kind=?1 AND gramps_id=?2",
                params![kind.as_str(), candidate],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_none() {
            return Ok(candidate);
        }
    }
}
