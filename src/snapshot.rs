//! Ledger File Module
//!
//! JSON document holding a starting pool and the epochs to apply to it:
//!
//! ```json
//! { "pool": [ { "id": { "tx_hash": "0x..", "index": 0 }, "output": { "value": 100000000, "owner": "0x.." } } ],
//!   "epochs": [ [ { "hash": "0x..", "inputs": [..], "outputs": [..] } ] ] }
//! ```
//!
//! Transactions without a hash are finalized on load; a hash that does not
//! match the transaction's content is an error.

use crate::{pool::UtxoPool, OutputId, Transaction, TxOutput};
use anyhow::{bail, Context};
use ethers::types::H256;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub id: OutputId,
    pub output: TxOutput,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerFile {
    pub pool: Vec<PoolEntry>,
    #[serde(default)]
    pub epochs: Vec<Vec<Transaction>>,
}

impl LedgerFile {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading ledger file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing ledger file {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let mut file: LedgerFile = serde_json::from_str(content)?;
        for (epoch, candidates) in file.epochs.iter_mut().enumerate() {
            for (position, tx) in candidates.iter_mut().enumerate() {
                let declared = tx.hash;
                let computed = tx.finalize();
                if declared != H256::zero() && declared != computed {
                    bail!(
                        "epoch {} candidate {}: declared hash {:?} does not match content hash {:?}",
                        epoch + 1,
                        position,
                        declared,
                        computed
                    );
                }
            }
        }
        debug!(
            "Loaded ledger file with {} pool entries and {} epochs",
            file.pool.len(),
            file.epochs.len()
        );
        Ok(file)
    }

    pub fn to_pool(&self) -> UtxoPool {
        self.pool
            .iter()
            .map(|entry| (entry.id, entry.output.clone()))
            .collect()
    }

    /// Split into the starting pool and the epochs
    pub fn into_parts(self) -> (UtxoPool, Vec<Vec<Transaction>>) {
        let pool = self.to_pool();
        (pool, self.epochs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{validation::LedgerValidator, Amount, InvalidTransaction, RejectReason};
    use ethers::types::Address;

    fn shipped() -> LedgerFile {
        LedgerFile::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config/genesis.json")).unwrap()
    }

    #[test]
    fn test_unhashed_transactions_are_finalized() {
        let file = LedgerFile::parse(
            r#"{ "pool": [], "epochs": [[ { "inputs": [], "outputs": [
                { "value": 5, "owner": "0x0000000000000000000000000000000000000001" } ] } ]] }"#,
        )
        .unwrap();

        let tx = &file.epochs[0][0];
        assert_ne!(tx.hash, H256::zero());
        assert_eq!(tx.outputs[0].value, Amount::from_minor_units(5));
        assert_eq!(tx.outputs[0].owner, Address::from_low_u64_be(1));
    }

    #[test]
    fn test_mismatched_hash_is_rejected() {
        let result = LedgerFile::parse(&format!(
            r#"{{ "pool": [], "epochs": [[ {{ "hash": "{:?}", "inputs": [], "outputs": [] }} ]] }}"#,
            H256::repeat_byte(1)
        ));
        assert!(result.is_err());
    }

    #[test]
    fn test_shipped_ledger_hashes_match_content() {
        let file = shipped();
        assert_eq!(file.pool.len(), 2);
        assert_eq!(file.epochs.iter().map(Vec::len).collect::<Vec<_>>(), vec![4, 2]);
    }

    #[test]
    fn test_shipped_ledger_replays_with_real_signatures() {
        let (pool, epochs) = shipped().into_parts();
        let mut validator = LedgerValidator::with_ecdsa(&pool);

        // alice pays bob, a racing double spend, bob spends the fresh output, bob overspends
        let first = validator.apply_epoch_with_report(&epochs[0]);
        assert_eq!(first.accepted, vec![epochs[0][0].clone(), epochs[0][2].clone()]);
        assert_eq!(first.fees, Amount::from_minor_units(50_000_000).into());
        let reasons: Vec<&RejectReason> = first.rejected.iter().map(|r| &r.reason).collect();
        assert!(matches!(
            reasons[..],
            [
                RejectReason::Invalid(InvalidTransaction::UnknownOutput(_)),
                RejectReason::Invalid(InvalidTransaction::ValueNotConserved { .. }),
            ]
        ));

        // carol spends her output, then tries to sign for bob's
        let second = validator.apply_epoch_with_report(&epochs[1]);
        assert_eq!(second.accepted, vec![epochs[1][0].clone()]);
        assert_eq!(
            second.rejected[0].reason,
            RejectReason::Invalid(InvalidTransaction::BadSignature { input: 0 })
        );

        let pool = validator.pool();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.total_value().to_amount(), Some("14.5".parse().unwrap()));
    }
}
