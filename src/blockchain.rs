// Thin re-export module: implementation is in `blockchain/core.rs` to allow
// progressive decomposition of ledger responsibilities (hashing, validation,
// chain management, tracking history).

pub mod core;
pub use self::core::*;
