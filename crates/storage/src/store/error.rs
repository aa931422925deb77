#![forbid(unsafe_code)]

use ks_core::{Handle, HandleError, MergeError, RecordKind};

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    Json(serde_json::Error),
    Config(toml::de::Error),
    InvalidInput(&'static str),
    InvalidHandle(HandleError),
    Merge(MergeError),
    UnknownId {
        kind: RecordKind,
        handle: Handle,
    },
    KindMismatch {
        expected: RecordKind,
        actual: RecordKind,
    },
    AlreadyExists {
        kind: RecordKind,
        handle: Handle,
    },
    StillReferenced {
        kind: RecordKind,
        handle: Handle,
        count: usize,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::Json(err) => write!(f, "json: {err}"),
            Self::Config(err) => write!(f, "config: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::InvalidHandle(err) => write!(f, "invalid handle: {err}"),
            Self::Merge(err) => write!(f, "merge: {err}"),
            Self::UnknownId { kind, handle } => write!(f, "unknown {kind} (handle={handle})"),
            Self::KindMismatch { expected, actual } => {
                write!(f, "kind mismatch (expected={expected}, actual={actual})")
            }
            Self::AlreadyExists { kind, handle } => {
                write!(f, "{kind} already exists (handle={handle})")
            }
            Self::StillReferenced {
                kind,
                handle,
                count,
            } => write!(
                f,
                "{kind} {handle} is still referenced by {count} record(s)"
            ),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Sql(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::InvalidHandle(err) => Some(err),
            Self::Merge(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(value: toml::de::Error) -> Self {
        Self::Config(value)
    }
}

impl From<HandleError> for StoreError {
    fn from(value: HandleError) -> Self {
        Self::InvalidHandle(value)
    }
}

impl From<MergeError> for StoreError {
    fn from(value: MergeError) -> Self {
        Self::Merge(value)
    }
}
