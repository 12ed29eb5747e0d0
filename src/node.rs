//! Shared, lock-protected ledger for concurrent callers.
//!
//! Reads (`validate`, `export`, `history`) take the read lock and see a
//! consistent chain. Mining is serialised by `seal_lock`: the tip is read,
//! the proof is searched for on a blocking worker with no ledger lock held,
//! and the block is sealed under the write lock. `Ledger::seal_block`
//! re-checks the proof, so a tip that moved in the meantime is rejected.

use crate::blockchain::{Block, ChainFault, Ledger, TrackingEntry};
use crate::error::Result;
use crate::miner::{spawn_search_with_cancel, CancelFlag};
use crate::transaction::Transaction;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

#[derive(Clone)]
pub struct LedgerNode {
    ledger: Arc<RwLock<Ledger>>,
    seal_lock: Arc<Mutex<()>>,
    shutdown: CancelFlag,
    blocks_mined: Arc<AtomicU64>,
}

impl LedgerNode {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            seal_lock: Arc::new(Mutex::new(())),
            shutdown: CancelFlag::new(),
            blocks_mined: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn ledger(&self) -> Arc<RwLock<Ledger>> {
        self.ledger.clone()
    }

    pub fn blocks_mined(&self) -> u64 {
        self.blocks_mined.load(Ordering::Relaxed)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Cancel any in-flight proof search; later `mine` calls fail fast.
    pub fn shutdown(&self) {
        info!("ledger node shutting down");
        self.shutdown.cancel();
    }

    pub async fn queue_transaction(
        &self,
        sender: &str,
        recipient: &str,
        subject_id: &str,
        status: &str,
    ) -> Result<u64> {
        self.ledger
            .write()
            .await
            .queue_transaction(sender, recipient, subject_id, status)
    }

    /// Search for the next proof off the async runtime, then seal the
    /// pending buffer into a block.
    pub async fn mine(&self) -> Result<Block> {
        let _sealing = self.seal_lock.lock().await;

        let (pow, limits, last_proof) = {
            let ledger = self.ledger.read().await;
            (
                ledger.proof_of_work(),
                ledger.search_limits(),
                ledger.last_block()?.proof,
            )
        };

        let task = spawn_search_with_cancel(pow, last_proof, limits, self.shutdown.clone());
        let proof = task.join().await?;

        let block = self.ledger.write().await.seal_block(proof, None)?;
        self.blocks_mined.fetch_add(1, Ordering::SeqCst);
        Ok(block)
    }

    /// Seal with a caller-supplied proof, serialised with `mine`.
    pub async fn seal_block(&self, proof: u64, previous_hash: Option<String>) -> Result<Block> {
        let _sealing = self.seal_lock.lock().await;
        self.ledger.write().await.seal_block(proof, previous_hash)
    }

    pub async fn validate(&self) -> bool {
        self.ledger.read().await.validate_chain()
    }

    pub async fn audit(&self) -> std::result::Result<(), ChainFault> {
        self.ledger.read().await.audit()
    }

    pub async fn export(&self) -> Vec<Block> {
        self.ledger.read().await.export()
    }

    pub async fn pending(&self) -> Vec<Transaction> {
        self.ledger.read().await.pending().to_vec()
    }

    pub async fn history(&self, subject_id: &str) -> Vec<TrackingEntry> {
        self.ledger.read().await.history(subject_id)
    }

    pub async fn len(&self) -> usize {
        self.ledger.read().await.len()
    }
}
