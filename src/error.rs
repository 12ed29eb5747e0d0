//! Error types for MediLedger

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The chain tip was requested while the chain holds no blocks.
    #[error("Chain is empty: no tip block available")]
    EmptyChain,
    #[error("Invalid proof supplied: {proof} does not solve the puzzle for last proof {last_proof}")]
    InvalidProofSupplied { last_proof: u64, proof: u64 },
    #[error("Proof search exhausted after {attempts} attempts")]
    ProofSearchExhausted { attempts: u64 },
    #[error("Proof search cancelled")]
    ProofSearchCancelled,
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error("Invalid difficulty {0}: must be between 1 and 64 leading hex zeros")]
    InvalidDifficulty(usize),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Mining task failed: {0}")]
    MiningTaskFailed(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, LedgerError>;
