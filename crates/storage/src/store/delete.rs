#![forbid(unsafe_code)]

use super::{DeleteOutcome, DeletePolicy, SqliteStore, StoreError};
use ks_core::{Handle, RecordKind};

impl SqliteStore {
    pub fn delete(
        &mut self,
        kind: RecordKind,
        handle: &Handle,
        policy: DeletePolicy,
    ) -> Result<DeleteOutcome, StoreError> {
        let mut txn = self.begin()?;
        let removed = txn.require(kind, handle)?;

        let detached = match policy {
            DeletePolicy::Block => {
                let count = txn
                    .find_referrers(kind, handle)
                    .try_fold(0usize, |count, referrer| referrer.map(|_| count + 1))?;
                if count > 0 {
                    tracing::warn!(
                        %kind,
                        %handle,
                        count,
                        "delete blocked by existing references"
                    );
                    return Err(StoreError::StillReferenced {
                        kind,
                        handle: handle.clone(),
                        count,
                    });
                }
                0
            }
            DeletePolicy::Detach => txn.detach_references(kind, handle)?,
        };

        txn.remove(kind, handle)?;
        let description = format!("delete {kind} {}", removed.gramps_id());
        let log = txn.commit(&description)?;

        tracing::info!(seq = log.seq, detached, "{description}");
        Ok(DeleteOutcome {
            removed,
            detached,
            log,
        })
    }
}
