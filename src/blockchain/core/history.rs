use crate::transaction::Transaction;
use serde::Serialize;

use super::chain::Ledger;

/// One recorded status change of a tracked item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingEntry {
    /// Index of the block holding the transaction; `None` while still pending.
    pub block_index: Option<u64>,
    pub tx_hash: String,
    pub transaction: Transaction,
}

impl TrackingEntry {
    pub fn is_confirmed(&self) -> bool {
        self.block_index.is_some()
    }
}

impl Ledger {
    /// Every transaction about `subject_id`, oldest first: sealed ones in
    /// chain order, then those still in the pending buffer.
    pub fn history(&self, subject_id: &str) -> Vec<TrackingEntry> {
        let sealed = self.blocks().iter().flat_map(|block| {
            block
                .transactions
                .iter()
                .map(move |tx| (Some(block.index), tx))
        });
        let pending = self.pending().iter().map(|tx| (None, tx));

        sealed
            .chain(pending)
            .filter(|(_, tx)| tx.subject_id == subject_id)
            .map(|(block_index, tx)| TrackingEntry {
                block_index,
                tx_hash: tx.hash_str(),
                transaction: tx.clone(),
            })
            .collect()
    }

    /// Most recent status recorded for `subject_id`, pending or sealed.
    pub fn current_status(&self, subject_id: &str) -> Option<String> {
        self.history(subject_id)
            .pop()
            .map(|entry| entry.transaction.status)
    }
}
