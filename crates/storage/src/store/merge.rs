#![forbid(unsafe_code)]

use super::{MergeOutcome, MergeRequest, SqliteStore, StoreError};
use ks_core::{MergeError, merge_records};

impl SqliteStore {
    /// Folds `donor` into `survivor` and moves every reference to the donor over
    /// to the survivor. All of it happens in one transaction; on any error the
    /// store is left exactly as it was.
    pub fn merge(&mut self, request: MergeRequest) -> Result<MergeOutcome, StoreError> {
        let MergeRequest {
            kind,
            survivor,
            donor,
            picks,
        } = request;
        if !kind.is_referenceable() {
            return Err(MergeError::NotMergeable(kind).into());
        }
        if survivor == donor {
            return Err(StoreError::InvalidInput("survivor and donor must differ"));
        }
        picks.validate(kind)?;

        let mut txn = self.begin()?;
        let mut merged = txn.require(kind, &survivor)?;
        let donor_record = txn.require(kind, &donor)?;
        let description = format!(
            "merge {kind} {} into {}",
            donor_record.gramps_id(),
            merged.gramps_id()
        );

        merge_records(&mut merged, &donor_record, &picks)?;
        let rewritten = txn.rewrite_references(kind, &donor, &survivor)?;
        // The survivor may have taken the donor's gramps id.
        txn.remove(kind, &donor)?;
        txn.put(&mut merged)?;
        let log = txn.commit(&description)?;

        tracing::info!(
            seq = log.seq,
            rewritten,
            changes = log.changes,
            "{description}"
        );
        Ok(MergeOutcome {
            survivor: merged,
            rewritten,
            log,
        })
    }
}
