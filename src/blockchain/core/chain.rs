use crate::clock::{Clock, SystemClock, Timestamp};
use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::miner::{CancelFlag, ProofOfWork, SearchLimits};
use crate::transaction::Transaction;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::canonical;
use super::validation::{audit_blocks, ChainFault};

pub const GENESIS_PREVIOUS_HASH: &str = "1";
pub const GENESIS_PROOF: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    /// 1-based position in the chain.
    pub index: u64,
    pub timestamp: Timestamp,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    /// Hex SHA-256 of the previous block, or the genesis sentinel.
    pub previous_hash: String,
}

impl Block {
    /// Hex SHA-256 over the block's canonical encoding. Never stored in the
    /// block itself.
    pub fn content_hash(&self) -> String {
        canonical::digest_hex(&canonical::block_value(self))
    }
}

/// Append-only chain of blocks plus the buffer of transactions waiting to
/// be sealed.
pub struct Ledger {
    chain: Vec<Block>,
    current_transactions: Vec<Transaction>,
    pow: ProofOfWork,
    limits: SearchLimits,
    clock: Arc<dyn Clock>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Create a ledger with default settings and the system clock.
    pub fn new() -> Self {
        Self::with_parts(
            ProofOfWork::default(),
            SearchLimits::unbounded(),
            GENESIS_PROOF,
            GENESIS_PREVIOUS_HASH.to_string(),
            Arc::new(SystemClock),
        )
    }

    pub fn from_config(config: &LedgerConfig) -> Result<Self> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    /// Create a ledger from `config`, taking every timestamp from `clock`.
    pub fn from_config_with_clock(config: &LedgerConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_parts(
            ProofOfWork::new(config.difficulty)?,
            config.search_limits(),
            config.genesis_proof,
            config.genesis_previous_hash.clone(),
            clock,
        ))
    }

    fn with_parts(
        pow: ProofOfWork,
        limits: SearchLimits,
        genesis_proof: u64,
        genesis_previous_hash: String,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let genesis = Block {
            index: 1,
            timestamp: clock.now(),
            transactions: Vec::new(),
            proof: genesis_proof,
            previous_hash: genesis_previous_hash,
        };
        debug!(proof = genesis.proof, "genesis block created");

        Ledger {
            chain: vec![genesis],
            current_transactions: Vec::new(),
            pow,
            limits,
            clock,
        }
    }

    pub fn proof_of_work(&self) -> ProofOfWork {
        self.pow
    }

    pub fn search_limits(&self) -> SearchLimits {
        self.limits
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.current_transactions
    }

    pub fn last_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    /// Queue a hand-off event. Returns the index the next sealed block will
    /// carry; the index is not reserved.
    pub fn queue_transaction(
        &mut self,
        sender: &str,
        recipient: &str,
        subject_id: &str,
        status: &str,
    ) -> Result<u64> {
        let tx = Transaction::new(sender, recipient, subject_id, status, self.clock.now());
        tx.validate()?;
        debug!(subject_id, status, "transaction queued");
        self.current_transactions.push(tx);
        Ok(self.next_index())
    }

    fn next_index(&self) -> u64 {
        self.chain.len() as u64 + 1
    }

    /// Seal the pending buffer into a new block on top of the current tip.
    ///
    /// `proof` must solve the puzzle for the tip's proof; anything else is
    /// rejected with `InvalidProofSupplied` and the ledger is left untouched.
    /// When `previous_hash` is `None` the tip's content hash is used.
    pub fn seal_block(&mut self, proof: u64, previous_hash: Option<String>) -> Result<Block> {
        let tip = self.last_block()?;
        if !self.pow.is_valid_proof(tip.proof, proof) {
            return Err(LedgerError::InvalidProofSupplied {
                last_proof: tip.proof,
                proof,
            });
        }

        let tip_hash = tip.content_hash();
        let previous_hash = match previous_hash {
            Some(supplied) => {
                if supplied != tip_hash {
                    warn!(
                        supplied = %supplied,
                        expected = %tip_hash,
                        "sealing with a previous hash that does not match the tip"
                    );
                }
                supplied
            }
            None => tip_hash,
        };

        let block = Block {
            index: self.next_index(),
            timestamp: self.clock.now(),
            transactions: std::mem::take(&mut self.current_transactions),
            proof,
            previous_hash,
        };
        self.chain.push(block.clone());

        info!(
            index = block.index,
            transactions = block.transactions.len(),
            proof = block.proof,
            "block sealed"
        );
        Ok(block)
    }

    /// Find the minimal proof for `last_proof`, honouring the configured
    /// search limits.
    pub fn solve_proof_of_work(&self, last_proof: u64) -> Result<u64> {
        self.pow.search(last_proof, &self.limits, &CancelFlag::new())
    }

    pub fn is_valid_proof(&self, last_proof: u64, proof: u64) -> bool {
        self.pow.is_valid_proof(last_proof, proof)
    }

    pub fn content_hash(block: &Block) -> String {
        block.content_hash()
    }

    /// Solve the puzzle for the current tip and seal the pending buffer.
    pub fn mine_block(&mut self) -> Result<Block> {
        let last_proof = self.last_block()?.proof;
        let proof = self.solve_proof_of_work(last_proof)?;
        self.seal_block(proof, None)
    }

    /// Re-check every link and proof from genesis forward.
    pub fn audit(&self) -> std::result::Result<(), ChainFault> {
        audit_blocks(&self.chain, &self.pow)
    }

    pub fn validate_chain(&self) -> bool {
        match self.audit() {
            Ok(()) => true,
            Err(fault) => {
                warn!(%fault, "chain validation failed");
                false
            }
        }
    }

    /// Snapshot of every block, in chain order.
    pub fn export(&self) -> Vec<Block> {
        self.chain.clone()
    }
}
