use crate::{
    batch::{EpochEngine, EpochReport},
    pool::UtxoPool,
    validation::SignatureVerifier,
    AmountSum, Transaction,
};
use ethers::types::Address;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Ledger shared between tasks
///
/// Validity checks take the read lock; an epoch holds the write lock for its
/// whole run, so nobody observes a half-applied batch.
pub struct SharedLedger<V> {
    engine: Arc<RwLock<EpochEngine<V>>>,
}

impl<V> Clone for SharedLedger<V> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<V: SignatureVerifier> SharedLedger<V> {
    pub fn new(engine: EpochEngine<V>) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
        }
    }

    pub async fn is_valid(&self, tx: &Transaction) -> bool {
        let engine = self.engine.read().await;
        engine.validator().is_valid(tx)
    }

    pub async fn process_epoch(&self, candidates: &[Transaction]) -> EpochReport {
        let mut engine = self.engine.write().await;
        engine.process(candidates)
    }

    /// Copy of the current pool
    pub async fn snapshot(&self) -> UtxoPool {
        let engine = self.engine.read().await;
        engine.validator().pool().clone()
    }

    pub async fn balance_of(&self, owner: &Address) -> AmountSum {
        let engine = self.engine.read().await;
        engine.validator().pool().balance_of(owner)
    }
}
