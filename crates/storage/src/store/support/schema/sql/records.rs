#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        -- Header columns are copies of the JSON body, kept for lookups.
        CREATE TABLE IF NOT EXISTS records (
          kind TEXT NOT NULL,
          handle TEXT NOT NULL,
          gramps_id TEXT NOT NULL,
          change_ms INTEGER NOT NULL,
          private INTEGER NOT NULL,
          body_json TEXT NOT NULL,
          PRIMARY KEY (kind, handle)
        );
"#;
