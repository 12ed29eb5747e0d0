// core.rs splits ledger responsibilities into submodules for easier maintenance.
pub mod canonical;
pub mod chain;
pub mod history;
pub mod validation;

pub use chain::*;
pub use history::*;
pub use validation::*;
