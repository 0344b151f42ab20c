//! Epoch Engine Module
//!
//! This module drives epoch processing on top of the ledger validator.
//! Each epoch is assigned a sequential ID and a timestamp.

use crate::{
    config::LedgerConfig,
    validation::{LedgerValidator, SignatureVerifier},
    AmountSum, RejectReason, Rejection, Transaction,
};
use chrono::{DateTime, Utc};
use ethers::types::H256;
use serde::Serialize;
use tracing::{info, warn};

/// Result of one processed epoch
#[derive(Debug, Clone, Serialize)]
pub struct EpochReport {
    pub epoch_id: u64,
    /// Accepted transactions, in submission order
    pub accepted: Vec<Transaction>,
    pub rejected: Vec<Rejection>,
    /// Total value destroyed as fees by the accepted transactions
    pub fees: AmountSum,
    pub timestamp: DateTime<Utc>,
}

impl EpochReport {
    pub fn accepted_hashes(&self) -> Vec<H256> {
        self.accepted.iter().map(|tx| tx.hash).collect()
    }
}

/// Epoch processing engine
///
/// Owns the ledger validator and numbers epochs sequentially.
pub struct EpochEngine<V> {
    validator: LedgerValidator<V>,
    /// Maximum candidates per epoch, 0 for no limit
    max_epoch_size: usize,
    /// Next epoch ID to assign (starts at 1)
    next_epoch_id: u64,
}

impl<V: SignatureVerifier> EpochEngine<V> {
    /// Creates a new epoch engine
    ///
    /// # Arguments
    /// * `validator` - Validator holding the starting pool
    /// * `config` - Ledger settings (epoch size limit)
    pub fn new(validator: LedgerValidator<V>, config: &LedgerConfig) -> Self {
        Self {
            validator,
            max_epoch_size: config.max_epoch_size,
            next_epoch_id: 1,
        }
    }

    pub fn validator(&self) -> &LedgerValidator<V> {
        &self.validator
    }

    pub fn next_epoch_id(&self) -> u64 {
        self.next_epoch_id
    }

    /// Apply one batch of candidates and seal it as the next epoch
    ///
    /// Candidates past `max_epoch_size` are rejected as over capacity without
    /// being validated. The rest go through `LedgerValidator::apply_epoch_with_report`.
    pub fn process(&mut self, candidates: &[Transaction]) -> EpochReport {
        let limit = match self.max_epoch_size {
            0 => candidates.len(),
            max => max.min(candidates.len()),
        };
        let (admitted, overflow) = candidates.split_at(limit);
        if !overflow.is_empty() {
            warn!(
                "Epoch #{} exceeds max size {}, dropping {} candidates",
                self.next_epoch_id,
                self.max_epoch_size,
                overflow.len()
            );
        }

        let mut outcome = self.validator.apply_epoch_with_report(admitted);
        outcome
            .rejected
            .extend(overflow.iter().enumerate().map(|(i, tx)| Rejection {
                position: limit + i,
                tx_hash: tx.hash,
                reason: RejectReason::OverCapacity,
            }));

        let report = EpochReport {
            epoch_id: self.next_epoch_id,
            accepted: outcome.accepted,
            rejected: outcome.rejected,
            fees: outcome.fees,
            timestamp: Utc::now(),
        };
        self.next_epoch_id += 1;

        info!(
            "Epoch #{} processed: {} accepted, {} rejected, fees {}, pool size {}",
            report.epoch_id,
            report.accepted.len(),
            report.rejected.len(),
            report.fees,
            self.validator.pool().len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pool::UtxoPool, Amount, InvalidTransaction, OutputId};
    use ethers::types::Address;

    /// Accepts every signature
    struct AcceptAll;

    impl SignatureVerifier for AcceptAll {
        fn verify(&self, _: &Address, _: &[u8], _: &[u8]) -> bool {
            true
        }
    }

    fn owner() -> Address {
        Address::repeat_byte(7)
    }

    fn pool_with(outputs: u32) -> (UtxoPool, H256) {
        let mut coinbase = Transaction::new();
        for _ in 0..outputs {
            coinbase.add_output(Amount::coins(5), owner());
        }
        let hash = coinbase.finalize();
        (UtxoPool::from_transactions([&coinbase]), hash)
    }

    fn spend(prev: H256, index: u32, coins: i64) -> Transaction {
        let mut tx = Transaction::new();
        tx.add_input(prev, index).add_output(Amount::coins(coins), owner());
        tx.finalize();
        tx
    }

    fn engine(pool: &UtxoPool, max_epoch_size: usize) -> EpochEngine<AcceptAll> {
        let config = LedgerConfig {
            max_epoch_size,
            ..LedgerConfig::default()
        };
        EpochEngine::new(LedgerValidator::new(pool, AcceptAll), &config)
    }

    #[test]
    fn test_epochs_are_numbered_sequentially() {
        let (pool, _) = pool_with(1);
        let mut engine = engine(&pool, 0);

        assert_eq!(engine.process(&[]).epoch_id, 1);
        assert_eq!(engine.process(&[]).epoch_id, 2);
        assert_eq!(engine.next_epoch_id(), 3);
    }

    #[test]
    fn test_pool_carries_over_between_epochs() {
        let (pool, genesis) = pool_with(1);
        let mut engine = engine(&pool, 0);

        let first = spend(genesis, 0, 4);
        let report = engine.process(&[first.clone()]);
        assert_eq!(report.accepted_hashes(), vec![first.hash]);
        assert_eq!(report.fees, Amount::coins(1).into());

        // the same output cannot be spent again in a later epoch
        let again = spend(genesis, 0, 3);
        let report = engine.process(&[again.clone()]);
        assert!(report.accepted.is_empty());
        assert_eq!(
            report.rejected[0].reason,
            RejectReason::Invalid(InvalidTransaction::UnknownOutput(OutputId::new(genesis, 0)))
        );

        let next = spend(first.hash, 0, 4);
        assert_eq!(engine.process(&[next]).accepted.len(), 1);
    }

    #[test]
    fn test_oversize_epoch_rejects_the_tail() {
        let (pool, genesis) = pool_with(3);
        let mut engine = engine(&pool, 2);
        let candidates: Vec<Transaction> = (0..3).map(|i| spend(genesis, i, 5)).collect();

        let report = engine.process(&candidates);
        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].position, 2);
        assert_eq!(report.rejected[0].reason, RejectReason::OverCapacity);
        // never validated, so its output is still spendable
        assert!(engine.validator().pool().contains(&OutputId::new(genesis, 2)));
    }
}
