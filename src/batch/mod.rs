//! Epoch Processing Module
//!
//! This module handles epoch processing:
//! - EpochEngine: applies ordered batches through the ledger validator and numbers them

mod engine;

pub use engine::{EpochEngine, EpochReport};
