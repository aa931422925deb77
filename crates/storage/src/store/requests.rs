#![forbid(unsafe_code)]

use ks_core::{FieldPicks, Handle, Record, RecordKind};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeRequest {
    pub kind: RecordKind,
    pub survivor: Handle,
    pub donor: Handle,
    pub picks: FieldPicks,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MergeOutcome {
    pub survivor: Record,
    /// Number of records whose references were moved from donor to survivor.
    pub rewritten: usize,
    pub log: TxnLogEntry,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Refuse while anything still references the record.
    #[default]
    Block,
    /// Strip the references from every referrer, then delete.
    Detach,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeleteOutcome {
    pub removed: Record,
    pub detached: usize,
    pub log: TxnLogEntry,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TxnLogEntry {
    pub seq: i64,
    pub ts_ms: i64,
    pub description: String,
    pub changes: usize,
}
