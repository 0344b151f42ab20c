//! This crate validates batches of value-transfer transactions against a pool
//! of unspent outputs and applies the accepted subset to the pool.
//! It includes modules for data types, amounts, the output pool, validation,
//! epoch processing, shared state, ledger files, and configuration.

pub mod amount; // Fixed-point monetary values.
pub mod types; // Transactions, output ids and rejection reasons.
pub mod pool; // The unspent output pool.
pub mod validation; // Signature verification and the ledger validator.
pub mod batch; // Sequential epoch processing.
pub mod state; // Lock-protected ledger shared between tasks.
pub mod snapshot; // JSON ledger files: starting pool plus epochs.
pub mod config; // Defines and loads system configuration.

// Re-export commonly used types and configurations for easier access.
pub use amount::{Amount, AmountParseError, AmountSum};
pub use types::*;
pub use config::Config;
pub use validation::LedgerValidator;
