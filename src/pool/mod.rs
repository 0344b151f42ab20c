//! Output Pool Module
//!
//! This module holds the set of currently spendable outputs, keyed by
//! the id of the output they name.

mod utxo_pool;

pub use utxo_pool::UtxoPool;
