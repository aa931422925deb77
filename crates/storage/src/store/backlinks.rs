#![forbid(unsafe_code)]

use super::support::{handles_tx, load_record_tx};
use super::{StoreError, StoreTxn};
use ks_core::{Handle, RecordKind};
use rusqlite::Connection;
use std::collections::BTreeSet;

/// Lazy scan for every record that references one target.
///
/// Holder kinds are visited in [`RecordKind`] order and handles ascending
/// within a kind. A record is loaded only when the scan reaches it. The first
/// storage error is yielded once and ends the scan.
pub struct Referrers<'a> {
    conn: &'a Connection,
    target: RecordKind,
    handle: Handle,
    holders: std::slice::Iter<'static, RecordKind>,
    current: Option<(RecordKind, std::vec::IntoIter<Handle>)>,
    done: bool,
}

impl<'a> Referrers<'a> {
    pub(super) fn new(conn: &'a Connection, target: RecordKind, handle: Handle) -> Self {
        Self {
            conn,
            target,
            handle,
            holders: target.holder_kinds().iter(),
            current: None,
            done: false,
        }
    }
}

impl Iterator for Referrers<'_> {
    type Item = Result<(RecordKind, Handle), StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if let Some((kind, candidates)) = self.current.as_mut() {
                let kind = *kind;
                for candidate in candidates.by_ref() {
                    match load_record_tx(self.conn, kind, &candidate) {
                        Ok(Some(record)) if record.references(self.target, &self.handle) => {
                            return Some(Ok((kind, candidate)));
                        }
                        Ok(_) => {}
                        Err(err) => {
                            self.done = true;
                            return Some(Err(err));
                        }
                    }
                }
            }
            let Some(kind) = self.holders.next().copied() else {
                self.done = true;
                return None;
            };
            match handles_tx(self.conn, kind) {
                Ok(handles) => self.current = Some((kind, handles.into_iter())),
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

impl StoreTxn<'_> {
    /// Points every reference to `old` at `new` across all referrers, collapsing
    /// duplicates that the retarget creates. Returns how many records changed.
    pub fn rewrite_references(
        &mut self,
        kind: RecordKind,
        old: &Handle,
        new: &Handle,
    ) -> Result<usize, StoreError> {
        if old == new {
            return Ok(0);
        }
        let referrers = self
            .find_referrers(kind, old)
            .collect::<Result<Vec<_>, _>>()?;
        for (holder_kind, holder) in &referrers {
            let mut record = self.require(*holder_kind, holder)?;
            record.replace_reference(kind, old, new);
            self.put(&mut record)?;
            tracing::debug!(
                holder_kind = %holder_kind,
                holder = %holder,
                from = %old,
                to = %new,
                "rewrote {kind} reference"
            );
        }
        Ok(referrers.len())
    }

    /// Strips every reference to `handle` from its referrers. Returns how many
    /// records changed.
    pub fn detach_references(
        &mut self,
        kind: RecordKind,
        handle: &Handle,
    ) -> Result<usize, StoreError> {
        let referrers = self
            .find_referrers(kind, handle)
            .collect::<Result<Vec<_>, _>>()?;
        let doomed: BTreeSet<Handle> = std::iter::once(handle.clone()).collect();
        for (holder_kind, holder) in &referrers {
            let mut record = self.require(*holder_kind, holder)?;
            record.remove_references_to(kind, &doomed);
            self.put(&mut record)?;
            tracing::debug!(
                holder_kind = %holder_kind,
                holder = %holder,
                target = %handle,
                "detached {kind} reference"
            );
        }
        Ok(referrers.len())
    }
}
