#![forbid(unsafe_code)]

mod sql;

use super::super::StoreError;
use rusqlite::{Connection, OptionalExtension, params};

const SCHEMA_VERSION: &str = "1";

pub(in crate::store) fn migrate_sqlite_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(&sql::full_schema_sql())?;

    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key='schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    match stored.as_deref() {
        None => {
            conn.execute(
                "INSERT INTO meta(key, value) VALUES (?1, ?2)",
                params!["schema_version", SCHEMA_VERSION],
            )?;
        }
        Some(SCHEMA_VERSION) => {}
        Some(_) => return Err(StoreError::InvalidInput("unsupported schema version")),
    }

    Ok(())
}
