//! State Management Module
//!
//! This module shares one epoch engine between async tasks.
//! Access is serialized with a read-write lock around each call.

mod shared;
pub use shared::SharedLedger;
