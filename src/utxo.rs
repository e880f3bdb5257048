//! Unspent output set: 𝒰𝒮 = 𝒪 → 𝒯

use crate::error::{LedgerError, Result};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mapping from OutPoint to the output it names.
///
/// Every key is an output that has been created but not yet spent by any
/// transaction in the ledger state this set represents. `Clone` is a deep,
/// independent copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoSet {
    utxos: HashMap<OutPoint, TransactionOutput>,
}

impl UtxoSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.utxos.contains_key(outpoint)
    }

    pub fn get(&self, outpoint: &OutPoint) -> Option<&TransactionOutput> {
        self.utxos.get(outpoint)
    }

    /// Like [`UtxoSet::get`], reporting an absent key as [`LedgerError::UtxoNotFound`].
    pub fn lookup(&self, outpoint: &OutPoint) -> Result<&TransactionOutput> {
        self.utxos
            .get(outpoint)
            .ok_or(LedgerError::UtxoNotFound(*outpoint))
    }

    /// Returns the previous output under `outpoint`, if any.
    pub fn insert(&mut self, outpoint: OutPoint, output: TransactionOutput) -> Option<TransactionOutput> {
        self.utxos.insert(outpoint, output)
    }

    pub fn remove(&mut self, outpoint: &OutPoint) -> Result<TransactionOutput> {
        self.utxos
            .remove(outpoint)
            .ok_or(LedgerError::UtxoNotFound(*outpoint))
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OutPoint, &TransactionOutput)> {
        self.utxos.iter()
    }

    pub fn outpoints(&self) -> impl Iterator<Item = &OutPoint> {
        self.utxos.keys()
    }

    /// Sum of every unspent output, `None` on overflow
    pub fn total_value(&self) -> Option<Amount> {
        self.utxos
            .values()
            .try_fold(0i64, |acc, output| acc.checked_add(output.value))
    }

    pub fn outputs_owned_by<'a>(
        &'a self,
        owner: &'a Identity,
    ) -> impl Iterator<Item = (&'a OutPoint, &'a TransactionOutput)> + 'a {
        self.utxos.iter().filter(move |(_, output)| &output.owner == owner)
    }

    /// Sum of the outputs owned by `owner`, `None` on overflow
    pub fn balance_of(&self, owner: &Identity) -> Option<Amount> {
        self.outputs_owned_by(owner)
            .try_fold(0i64, |acc, (_, output)| acc.checked_add(output.value))
    }

    /// Add every output of `tx` keyed by its identity digest.
    pub(crate) fn add_outputs(&mut self, tx: &Transaction) {
        let tx_id = tx.identity_digest();
        for (i, output) in tx.outputs.iter().enumerate() {
            self.utxos.insert(OutPoint::new(tx_id, i as u32), output.clone());
        }
    }
}

impl FromIterator<(OutPoint, TransactionOutput)> for UtxoSet {
    fn from_iter<I: IntoIterator<Item = (OutPoint, TransactionOutput)>>(iter: I) -> Self {
        Self {
            utxos: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(byte: u8) -> Identity {
        Identity(vec![byte; 33])
    }

    #[test]
    fn test_insert_get_remove() {
        let mut utxo_set = UtxoSet::new();
        let outpoint = OutPoint::new([1; 32], 0);
        assert!(utxo_set.insert(outpoint, TransactionOutput::new(owner(1), 10)).is_none());

        assert!(utxo_set.contains(&outpoint));
        assert_eq!(utxo_set.get(&outpoint).unwrap().value, 10);
        assert_eq!(utxo_set.remove(&outpoint).unwrap().value, 10);
        assert!(utxo_set.is_empty());
    }

    #[test]
    fn test_missing_key_is_lookup_failure() {
        let mut utxo_set = UtxoSet::new();
        let outpoint = OutPoint::new([2; 32], 3);
        assert_eq!(utxo_set.lookup(&outpoint), Err(LedgerError::UtxoNotFound(outpoint)));
        assert_eq!(utxo_set.remove(&outpoint), Err(LedgerError::UtxoNotFound(outpoint)));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = UtxoSet::new();
        let outpoint = OutPoint::new([3; 32], 0);
        original.insert(outpoint, TransactionOutput::new(owner(1), 4));

        let mut copy = original.clone();
        copy.remove(&outpoint).unwrap();
        copy.insert(OutPoint::new([4; 32], 1), TransactionOutput::new(owner(2), 6));

        assert!(original.contains(&outpoint));
        assert_eq!(original.len(), 1);
        assert_eq!(copy.len(), 1);
    }

    #[test]
    fn test_balances() {
        let utxo_set: UtxoSet = vec![
            (OutPoint::new([1; 32], 0), TransactionOutput::new(owner(1), 4)),
            (OutPoint::new([1; 32], 1), TransactionOutput::new(owner(2), 6)),
            (OutPoint::new([2; 32], 0), TransactionOutput::new(owner(1), 3)),
        ]
        .into_iter()
        .collect();

        assert_eq!(utxo_set.balance_of(&owner(1)), Some(7));
        assert_eq!(utxo_set.balance_of(&owner(3)), Some(0));
        assert_eq!(utxo_set.total_value(), Some(13));
    }

    #[test]
    fn test_total_value_overflow() {
        let utxo_set: UtxoSet = vec![
            (OutPoint::new([1; 32], 0), TransactionOutput::new(owner(1), i64::MAX)),
            (OutPoint::new([1; 32], 1), TransactionOutput::new(owner(1), 1)),
        ]
        .into_iter()
        .collect();
        assert_eq!(utxo_set.total_value(), None);
    }

    #[test]
    fn test_balance_overflow() {
        let utxo_set: UtxoSet = vec![
            (OutPoint::new([1; 32], 0), TransactionOutput::new(owner(1), i64::MAX)),
            (OutPoint::new([1; 32], 1), TransactionOutput::new(owner(1), 1)),
            (OutPoint::new([1; 32], 2), TransactionOutput::new(owner(2), 1)),
        ]
        .into_iter()
        .collect();
        assert_eq!(utxo_set.balance_of(&owner(1)), None);
        assert_eq!(utxo_set.balance_of(&owner(2)), Some(1));
    }
}
