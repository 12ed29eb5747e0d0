//! MediLedger - an append-only, proof-of-work secured ledger of
//! pharmaceutical hand-offs
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the ledger, canonical hashing, chain audit, tracking history
//! - [`transaction`] - Hand-off records and their validation
//!
//! ## Consensus
//! - [`miner`] - Proof-of-work puzzle, bounded and cancellable proof search
//!
//! ## Runtime
//! - [`node`] - Shared ledger with serialised sealing for concurrent callers
//! - [`api`] - REST endpoints (feature `api`)
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`clock`] - Injectable time sources
//! - [`error`] - Error types
//! - [`cli`] - CLI utilities
//!
//! # Example
//!
//! ```rust
//! use mediledger::blockchain::Ledger;
//!
//! let mut ledger = Ledger::new();
//! ledger.queue_transaction("Manufacturer", "Distributor", "Product-1", "Received").unwrap();
//!
//! let last_proof = ledger.last_block().unwrap().proof;
//! let proof = ledger.solve_proof_of_work(last_proof).unwrap();
//! let block = ledger.seal_block(proof, None).unwrap();
//!
//! assert_eq!(block.index, 2);
//! assert!(ledger.validate_chain());
//! ```

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod transaction;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod miner;

// ============================================================================
// Runtime
// ============================================================================
pub mod node;

#[cfg(feature = "api")]
pub mod api;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;

pub use blockchain::{Block, ChainFault, Ledger, TrackingEntry};
pub use error::{LedgerError, Result};
pub use transaction::Transaction;
