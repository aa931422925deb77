#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MAX_HANDLE_LEN: usize = 64;

/// Opaque, immutable identifier of a primary record.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, HandleError> {
        let value = value.into();
        validate_handle(&value)?;
        Ok(Self(value))
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Handle {
    type Error = HandleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<Handle> for String {
    fn from(value: Handle) -> Self {
        value.0
    }
}

impl FromStr for Handle {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_new(s.trim())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandleError {
    Empty,
    TooLong,
    InvalidChar { ch: char, index: usize },
}

impl HandleError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "handle must not be empty",
            Self::TooLong => "handle is too long",
            Self::InvalidChar { .. } => "handle may only contain [A-Za-z0-9_-]",
        }
    }
}

impl fmt::Display for HandleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChar { ch, index } => {
                write!(f, "{} (found {ch:?} at {index})", self.message())
            }
            other => f.write_str(other.message()),
        }
    }
}

impl std::error::Error for HandleError {}

fn validate_handle(value: &str) -> Result<(), HandleError> {
    if value.trim().is_empty() {
        return Err(HandleError::Empty);
    }
    if value.len() > MAX_HANDLE_LEN {
        return Err(HandleError::TooLong);
    }
    for (index, ch) in value.chars().enumerate() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-') {
            continue;
        }
        return Err(HandleError::InvalidChar { ch, index });
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Person,
    Family,
    Event,
    Place,
    Source,
    Repository,
    Media,
    Note,
}

impl RecordKind {
    pub const ALL: [RecordKind; 8] = [
        RecordKind::Person,
        RecordKind::Family,
        RecordKind::Event,
        RecordKind::Place,
        RecordKind::Source,
        RecordKind::Repository,
        RecordKind::Media,
        RecordKind::Note,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Person => "person",
            RecordKind::Family => "family",
            RecordKind::Event => "event",
            RecordKind::Place => "place",
            RecordKind::Source => "source",
            RecordKind::Repository => "repository",
            RecordKind::Media => "media",
            RecordKind::Note => "note",
        }
    }

    /// Prefix of the human-facing id, e.g. `S` in `S0007`.
    pub fn id_prefix(self) -> char {
        match self {
            RecordKind::Person => 'I',
            RecordKind::Family => 'F',
            RecordKind::Event => 'E',
            RecordKind::Place => 'P',
            RecordKind::Source => 'S',
            RecordKind::Repository => 'R',
            RecordKind::Media => 'O',
            RecordKind::Note => 'N',
        }
    }

    pub fn format_gramps_id(self, seq: i64) -> String {
        format!("{}{:04}", self.id_prefix(), seq)
    }

    /// Kinds whose records can hold a reference to a record of this kind.
    /// Empty for kinds that are never the target of a reference.
    pub fn holder_kinds(self) -> &'static [RecordKind] {
        match self {
            RecordKind::Source => &[
                RecordKind::Person,
                RecordKind::Family,
                RecordKind::Event,
                RecordKind::Place,
                RecordKind::Repository,
                RecordKind::Media,
            ],
            RecordKind::Repository => &[RecordKind::Source],
            RecordKind::Media => &[
                RecordKind::Person,
                RecordKind::Family,
                RecordKind::Event,
                RecordKind::Place,
            ],
            RecordKind::Note => &[
                RecordKind::Person,
                RecordKind::Family,
                RecordKind::Event,
                RecordKind::Place,
                RecordKind::Source,
                RecordKind::Repository,
                RecordKind::Media,
            ],
            RecordKind::Person | RecordKind::Family | RecordKind::Event | RecordKind::Place => &[],
        }
    }

    pub fn is_referenceable(self) -> bool {
        !self.holder_kinds().is_empty()
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownRecordKind(pub String);

impl fmt::Display for UnknownRecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown record kind: {}", self.0)
    }
}

impl std::error::Error for UnknownRecordKind {}

impl FromStr for RecordKind {
    type Err = UnknownRecordKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered)
            .ok_or_else(|| UnknownRecordKind(s.to_string()))
    }
}
