//! Transaction Validation Module
//!
//! This module decides which transactions may be applied to the unspent
//! output pool and applies accepted batches.
//! Performs double-claim detection, pool membership, signature verification
//! and value conservation checks.

mod crypto;
mod validator;


pub use crypto::{EcdsaVerifier, SignatureVerifier};
pub use validator::LedgerValidator;
