#![forbid(unsafe_code)]

use crate::Command;
use anyhow::{Context, Result, anyhow};
use ks_core::{FieldPicks, Record};
use ks_storage::{DeletePolicy, MergeRequest, SqliteStore};
use serde_json::{Value, json};
use std::path::Path;

pub(crate) fn run(storage_dir: &Path, cmd: Command) -> Result<String> {
    let mut store = SqliteStore::open(storage_dir)
        .with_context(|| format!("opening store at {}", storage_dir.display()))?;
    let value = execute(&mut store, cmd)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

pub(crate) fn execute(store: &mut SqliteStore, cmd: Command) -> Result<Value> {
    match cmd {
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let records: Vec<Record> = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", file.display()))?;
            let stored = store.import(records).context("import")?;
            Ok(Value::Array(stored.iter().map(summary).collect()))
        }
        Command::Show { kind, handle } => {
            let record = store
                .get(kind, &handle)?
                .ok_or_else(|| anyhow!("no {kind} with handle {handle}"))?;
            Ok(serde_json::to_value(record)?)
        }
        Command::List { kind } => {
            let handles = store.handles(kind)?;
            Ok(json!(handles))
        }
        Command::Referrers { kind, handle } => {
            let mut out = Vec::new();
            for referrer in store.find_referrers(kind, &handle) {
                let (holder_kind, holder) = referrer?;
                out.push(json!({ "kind": holder_kind, "handle": holder }));
            }
            Ok(Value::Array(out))
        }
        Command::Merge {
            kind,
            survivor,
            donor,
            take,
        } => {
            let request = MergeRequest {
                kind,
                survivor,
                donor,
                picks: take.into_iter().collect::<FieldPicks>(),
            };
            let outcome = store.merge(request).context("merge")?;
            Ok(serde_json::to_value(outcome)?)
        }
        Command::Delete {
            kind,
            handle,
            detach,
        } => {
            let policy = if detach {
                DeletePolicy::Detach
            } else {
                DeletePolicy::Block
            };
            let outcome = store.delete(kind, &handle, policy).context("delete")?;
            Ok(json!({
                "removed": summary(&outcome.removed),
                "detached": outcome.detached,
                "log": outcome.log,
            }))
        }
        Command::Log { limit } => Ok(json!(store.txn_log(limit)?)),
    }
}

fn summary(record: &Record) -> Value {
    json!({
        "kind": record.kind(),
        "handle": record.handle(),
        "gramps_id": record.gramps_id(),
    })
}
