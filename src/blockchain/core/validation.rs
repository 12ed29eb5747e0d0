use crate::miner::ProofOfWork;
use std::fmt;

use super::chain::Block;

/// First inconsistency found while walking the chain. Reported as an audit
/// outcome, not raised as an error; callers decide what to do with it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainFault {
    Empty,
    /// `previous_hash` of block `index` is not the content hash of its predecessor.
    BrokenLink { index: u64 },
    /// The proof of block `index` does not solve the puzzle for its predecessor's proof.
    InvalidProof { index: u64 },
}

impl fmt::Display for ChainFault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainFault::Empty => write!(f, "Chain has no blocks"),
            ChainFault::BrokenLink { index } => {
                write!(f, "Block {} does not link to its predecessor", index)
            }
            ChainFault::InvalidProof { index } => {
                write!(f, "Block {} carries an invalid proof of work", index)
            }
        }
    }
}

pub fn audit_blocks(blocks: &[Block], pow: &ProofOfWork) -> Result<(), ChainFault> {
    if blocks.is_empty() {
        return Err(ChainFault::Empty);
    }

    for pair in blocks.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.previous_hash != prev.content_hash() {
            return Err(ChainFault::BrokenLink { index: cur.index });
        }
        if !pow.is_valid_proof(prev.proof, cur.proof) {
            return Err(ChainFault::InvalidProof { index: cur.index });
        }
    }
    Ok(())
}

pub fn validate_blocks(blocks: &[Block], pow: &ProofOfWork) -> bool {
    audit_blocks(blocks, pow).is_ok()
}
