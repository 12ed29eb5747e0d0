//! Proof-of-work puzzle and proof search.
//!
//! A proof `p'` solves the puzzle for the previous proof `p` when
//! `sha256(format!("{p}{p'}"))` starts with `difficulty` hex zeros. The search
//! walks candidates upward from zero, so the first hit is the minimal solution.

use crate::error::{LedgerError, Result};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const DEFAULT_DIFFICULTY: usize = 4;
pub const MAX_DIFFICULTY: usize = 64;

/// How often the search looks at the cancel flag and the clock.
const CHECK_INTERVAL: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: usize,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        ProofOfWork {
            difficulty: DEFAULT_DIFFICULTY,
        }
    }
}

impl ProofOfWork {
    pub fn new(difficulty: usize) -> Result<Self> {
        if difficulty == 0 || difficulty > MAX_DIFFICULTY {
            return Err(LedgerError::InvalidDifficulty(difficulty));
        }
        Ok(ProofOfWork { difficulty })
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn is_valid_proof(&self, last_proof: u64, proof: u64) -> bool {
        let guess = format!("{}{}", last_proof, proof);
        let guess_hash = hex::encode(Sha256::digest(guess.as_bytes()));
        guess_hash.bytes().take(self.difficulty).all(|c| c == b'0')
    }

    /// Unbounded search. Blocks the caller until a proof is found.
    pub fn solve(&self, last_proof: u64) -> u64 {
        let mut proof = 0;
        while !self.is_valid_proof(last_proof, proof) {
            proof += 1;
        }
        proof
    }

    /// Search bounded by `limits` that gives up early once `cancel` is set.
    pub fn search(&self, last_proof: u64, limits: &SearchLimits, cancel: &CancelFlag) -> Result<u64> {
        let started = Instant::now();
        let deadline = limits.max_duration.map(|d| started + d);
        let mut proof: u64 = 0;

        debug!(last_proof, difficulty = self.difficulty, "proof search started");
        loop {
            if self.is_valid_proof(last_proof, proof) {
                info!(
                    last_proof,
                    proof,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "proof found"
                );
                return Ok(proof);
            }

            let attempts = proof + 1;
            if limits.max_attempts.is_some_and(|max| attempts >= max) {
                warn!(last_proof, attempts, "proof search hit its attempt ceiling");
                return Err(LedgerError::ProofSearchExhausted { attempts });
            }
            if attempts % CHECK_INTERVAL == 0 {
                if cancel.is_cancelled() {
                    info!(last_proof, attempts, "proof search cancelled");
                    return Err(LedgerError::ProofSearchCancelled);
                }
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    warn!(last_proof, attempts, "proof search hit its time ceiling");
                    return Err(LedgerError::ProofSearchExhausted { attempts });
                }
            }
            proof = proof
                .checked_add(1)
                .ok_or(LedgerError::ProofSearchExhausted { attempts })?;
        }
    }
}

/// Ceilings for a single proof search. `None` means no ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_attempts: Option<u64>,
    pub max_duration: Option<Duration>,
}

impl SearchLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn attempts(max_attempts: u64) -> Self {
        SearchLimits {
            max_attempts: Some(max_attempts),
            max_duration: None,
        }
    }
}

/// Shared cancellation signal for proof searches.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A proof search running on the blocking thread pool.
pub struct MiningTask {
    cancel: CancelFlag,
    handle: JoinHandle<Result<u64>>,
}

impl MiningTask {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Resolves once with the proof or the reason the search stopped.
    pub async fn join(self) -> Result<u64> {
        self.handle
            .await
            .map_err(|e| LedgerError::MiningTaskFailed(e.to_string()))?
    }
}

/// Start a search for `last_proof` on a dedicated blocking worker.
pub fn spawn_search(pow: ProofOfWork, last_proof: u64, limits: SearchLimits) -> MiningTask {
    spawn_search_with_cancel(pow, last_proof, limits, CancelFlag::new())
}

/// Like [`spawn_search`], observing an existing cancel flag (e.g. a
/// node-wide shutdown signal).
pub fn spawn_search_with_cancel(
    pow: ProofOfWork,
    last_proof: u64,
    limits: SearchLimits,
    cancel: CancelFlag,
) -> MiningTask {
    let flag = cancel.clone();
    let handle = tokio::task::spawn_blocking(move || pow.search(last_proof, &limits, &flag));
    MiningTask { cancel, handle }
}
