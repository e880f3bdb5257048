//! Pending transaction pool
//!
//! Holds transactions not yet included in any committed block. Insertion does
//! no validation; transactions are only checked when a block carrying them is
//! proposed.

use crate::types::*;
use std::collections::HashMap;

/// Transactions keyed by identity digest, listed in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PendingTransactionPool {
    transactions: HashMap<Hash, (u64, Transaction)>,
    next_sequence: u64,
}

impl PendingTransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `tx`. Re-inserting a known transaction keeps its original position.
    pub fn insert(&mut self, tx: Transaction) -> Hash {
        let tx_id = tx.identity_digest();
        if !self.transactions.contains_key(&tx_id) {
            self.transactions.insert(tx_id, (self.next_sequence, tx));
            self.next_sequence += 1;
        }
        tx_id
    }

    pub fn remove(&mut self, tx_id: &Hash) -> Option<Transaction> {
        self.transactions.remove(tx_id).map(|(_, tx)| tx)
    }

    pub fn get(&self, tx_id: &Hash) -> Option<&Transaction> {
        self.transactions.get(tx_id).map(|(_, tx)| tx)
    }

    pub fn contains(&self, tx_id: &Hash) -> bool {
        self.transactions.contains_key(tx_id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// All pending transactions, oldest first
    pub fn transactions(&self) -> Vec<Transaction> {
        let mut entries: Vec<_> = self.transactions.values().collect();
        entries.sort_by_key(|(sequence, _)| *sequence);
        entries.into_iter().map(|(_, tx)| tx.clone()).collect()
    }

    /// Drop every ordinary transaction committed by `block`.
    pub fn remove_block(&mut self, block: &Block) {
        for tx in &block.transactions {
            // The pool may never have seen it
            self.remove(&tx.identity_digest());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(byte: u8) -> Transaction {
        Transaction::new(
            vec![TransactionInput::unsigned(OutPoint::new([byte; 32], 0))],
            vec![TransactionOutput::new(Identity(vec![byte; 33]), byte as Amount)],
        )
    }

    #[test]
    fn test_insert_and_remove() {
        let mut pool = PendingTransactionPool::new();
        let id = pool.insert(tx(1));
        assert!(pool.contains(&id));
        assert_eq!(pool.get(&id), Some(&tx(1)));
        assert_eq!(pool.remove(&id), Some(tx(1)));
        assert!(pool.is_empty());
        assert_eq!(pool.remove(&id), None);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut pool = PendingTransactionPool::new();
        for byte in [3, 1, 2] {
            pool.insert(tx(byte));
        }
        pool.insert(tx(3));

        assert_eq!(pool.len(), 3);
        assert_eq!(pool.transactions(), vec![tx(3), tx(1), tx(2)]);
    }

    #[test]
    fn test_remove_block() {
        let mut pool = PendingTransactionPool::new();
        pool.insert(tx(1));
        pool.insert(tx(2));

        let block = Block::new([0; 32], vec![], vec![tx(1), tx(9)]);
        pool.remove_block(&block);

        assert_eq!(pool.transactions(), vec![tx(2)]);
    }
}
