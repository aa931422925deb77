#![forbid(unsafe_code)]

use super::StoreError;
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILE: &str = "kinship.toml";

/// Connection tuning read from `<storage_dir>/kinship.toml`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "StoreConfig::default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default = "StoreConfig::default_foreign_keys")]
    pub foreign_keys: bool,
    #[serde(default)]
    pub journal_mode: JournalMode,
    #[serde(default = "StoreConfig::default_db_file")]
    pub db_file: String,
}

impl StoreConfig {
    pub fn load(storage_dir: &Path) -> Result<Self, StoreError> {
        let path = storage_dir.join(CONFIG_FILE);
        if !path.exists() {
            tracing::info!(
                "no config file at {}, using StoreConfig::default()",
                path.display()
            );
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)?;
        let config: StoreConfig = toml::from_str(&text)?;
        if config.db_file.trim().is_empty() {
            return Err(StoreError::InvalidInput("db_file must not be empty"));
        }
        Ok(config)
    }

    fn default_busy_timeout_ms() -> u64 {
        5_000
    }

    fn default_foreign_keys() -> bool {
        true
    }

    fn default_db_file() -> String {
        "kinship.db".to_string()
    }

    pub(super) fn pragmas_sql(&self) -> String {
        format!(
            "PRAGMA foreign_keys = {};\nPRAGMA journal_mode = {};\n",
            if self.foreign_keys { "ON" } else { "OFF" },
            self.journal_mode.as_str()
        )
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: Self::default_busy_timeout_ms(),
            foreign_keys: Self::default_foreign_keys(),
            journal_mode: JournalMode::default(),
            db_file: Self::default_db_file(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum JournalMode {
    #[default]
    #[serde(rename = "WAL", alias = "wal")]
    Wal,
    #[serde(rename = "DELETE", alias = "delete")]
    Delete,
    #[serde(rename = "TRUNCATE", alias = "truncate")]
    Truncate,
    #[serde(rename = "MEMORY", alias = "memory")]
    Memory,
}

impl JournalMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wal => "WAL",
            Self::Delete => "DELETE",
            Self::Truncate => "TRUNCATE",
            Self::Memory => "MEMORY",
        }
    }
}
