#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE UNIQUE INDEX IF NOT EXISTS idx_records_handle ON records(handle);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_records_gramps_id ON records(kind, gramps_id);
        CREATE INDEX IF NOT EXISTS idx_txn_log_ts ON txn_log(ts_ms);
"#;
