//! Unspent Output Pool Module
//!
//! Maps every spendable output id to the output it names. An id is present
//! exactly when its output has been minted and not yet consumed by an
//! applied transaction.

use crate::{AmountSum, OutputId, Transaction, TxOutput};
use ethers::types::Address;
use std::collections::HashMap;

/// Pool of unspent transaction outputs
///
/// `Clone` produces a fully independent copy; validators always work on
/// their own copy so one validator's epoch never shows up in another's.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoPool {
    utxos: HashMap<OutputId, TxOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a pool with every output of already finalized transactions
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let mut pool = Self::new();
        for tx in transactions {
            for (id, output) in tx.minted_ids() {
                pool.insert(id, output.clone());
            }
        }
        pool
    }

    pub fn contains(&self, id: &OutputId) -> bool {
        self.utxos.contains_key(id)
    }

    pub fn get(&self, id: &OutputId) -> Option<&TxOutput> {
        self.utxos.get(id)
    }

    /// Insert or overwrite. Returns the record previously stored under `id`.
    pub fn insert(&mut self, id: OutputId, output: TxOutput) -> Option<TxOutput> {
        self.utxos.insert(id, output)
    }

    /// Remove `id` if present; removing an absent id is a no-op.
    pub fn remove(&mut self, id: &OutputId) -> Option<TxOutput> {
        self.utxos.remove(id)
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OutputId, &TxOutput)> {
        self.utxos.iter()
    }

    /// Ids in a stable order, for reporting
    pub fn sorted_ids(&self) -> Vec<OutputId> {
        let mut ids: Vec<OutputId> = self.utxos.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn total_value(&self) -> AmountSum {
        self.utxos.values().map(|output| output.value).sum()
    }

    pub fn outputs_owned_by<'a>(
        &'a self,
        owner: &'a Address,
    ) -> impl Iterator<Item = (&'a OutputId, &'a TxOutput)> + 'a {
        self.utxos.iter().filter(move |(_, output)| &output.owner == owner)
    }

    pub fn balance_of(&self, owner: &Address) -> AmountSum {
        self.outputs_owned_by(owner).map(|(_, output)| output.value).sum()
    }
}

impl FromIterator<(OutputId, TxOutput)> for UtxoPool {
    fn from_iter<I: IntoIterator<Item = (OutputId, TxOutput)>>(iter: I) -> Self {
        Self {
            utxos: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for UtxoPool {
    type Item = (OutputId, TxOutput);
    type IntoIter = std::collections::hash_map::IntoIter<OutputId, TxOutput>;

    fn into_iter(self) -> Self::IntoIter {
        self.utxos.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Amount;
    use ethers::types::H256;

    fn id(byte: u8, index: u32) -> OutputId {
        OutputId::new(H256::repeat_byte(byte), index)
    }

    fn output(coins: i64, owner: u8) -> TxOutput {
        TxOutput::new(Amount::coins(coins), Address::repeat_byte(owner))
    }

    #[test]
    fn insert_lookup_remove() {
        let mut pool = UtxoPool::new();
        assert!(pool.is_empty());

        assert_eq!(pool.insert(id(1, 0), output(10, 1)), None);
        assert!(pool.contains(&id(1, 0)));
        assert_eq!(pool.get(&id(1, 0)), Some(&output(10, 1)));
        assert_eq!(pool.get(&id(1, 1)), None);

        assert_eq!(pool.remove(&id(1, 0)), Some(output(10, 1)));
        assert!(!pool.contains(&id(1, 0)));
        // absent ids are a no-op
        assert_eq!(pool.remove(&id(1, 0)), None);
    }

    #[test]
    fn insert_overwrites() {
        let mut pool = UtxoPool::new();
        pool.insert(id(1, 0), output(10, 1));
        assert_eq!(pool.insert(id(1, 0), output(3, 2)), Some(output(10, 1)));
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(&id(1, 0)), Some(&output(3, 2)));
    }

    #[test]
    fn clone_is_independent() {
        let mut original = UtxoPool::new();
        original.insert(id(1, 0), output(10, 1));

        let mut copy = original.clone();
        copy.remove(&id(1, 0));
        copy.insert(id(2, 0), output(4, 2));

        assert!(original.contains(&id(1, 0)));
        assert!(!original.contains(&id(2, 0)));
        assert_eq!(original.len(), 1);
    }

    #[test]
    fn seeded_from_transactions() {
        let mut tx = Transaction::new();
        tx.add_output(Amount::coins(10), Address::repeat_byte(1))
            .add_output(Amount::coins(20), Address::repeat_byte(2));
        let hash = tx.finalize();

        let pool = UtxoPool::from_transactions([&tx]);
        assert_eq!(pool.sorted_ids(), vec![OutputId::new(hash, 0), OutputId::new(hash, 1)]);
        assert_eq!(pool.total_value().to_amount(), Some(Amount::coins(30)));
    }

    #[test]
    fn balances_per_owner() {
        let pool: UtxoPool = [(id(1, 0), output(10, 1)), (id(1, 1), output(5, 1)), (id(2, 0), output(7, 2))]
            .into_iter()
            .collect();

        assert_eq!(pool.balance_of(&Address::repeat_byte(1)).to_amount(), Some(Amount::coins(15)));
        assert_eq!(pool.outputs_owned_by(&Address::repeat_byte(2)).count(), 1);
        assert_eq!(pool.balance_of(&Address::repeat_byte(3)).to_amount(), Some(Amount::ZERO));
    }
}
