//! Shared access to a [`BlockTree`] from several threads
//!
//! Writers (`add_block`, `add_transaction`, `create_block`) take the write lock,
//! so each runs atomically with respect to every other operation. Readers share
//! the read lock and may run alongside each other.

use crate::blocktree::BlockTree;
use crate::error::Result;
use crate::types::*;
use crate::utxo::UtxoSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone)]
pub struct SharedBlockTree {
    inner: Arc<RwLock<BlockTree>>,
}

impl SharedBlockTree {
    pub fn new(tree: BlockTree) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    // Tree methods never leave partial state behind, so a poisoned lock is still usable
    fn read(&self) -> RwLockReadGuard<'_, BlockTree> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BlockTree> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_block(&self, block: Block) -> bool {
        self.write().add_block(block)
    }

    pub fn try_add_block(&self, block: Block) -> Result<Hash> {
        self.write().try_add_block(block)
    }

    pub fn add_transaction(&self, tx: Transaction) {
        self.write().add_transaction(tx)
    }

    pub fn create_block(&self, reward_owner: Identity) -> Result<Block> {
        self.write().create_block(reward_owner)
    }

    pub fn max_height(&self) -> Height {
        self.read().max_height()
    }

    pub fn max_height_block(&self) -> Block {
        self.read().max_height_block().clone()
    }

    pub fn max_height_utxo_set(&self) -> UtxoSet {
        self.read().max_height_utxo_set()
    }

    /// Run `f` against a consistent view of the tree.
    pub fn with_tree<R>(&self, f: impl FnOnce(&BlockTree) -> R) -> R {
        f(&*self.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::identity_of;
    use secp256k1::SecretKey;
    use std::thread;

    fn owner(byte: u8) -> Identity {
        identity_of(&SecretKey::from_slice(&[byte; 32]).unwrap())
    }

    #[test]
    fn test_concurrent_writers_serialize() {
        let genesis = Block::genesis(vec![TransactionOutput::new(owner(1), 10)]);
        let shared = SharedBlockTree::new(BlockTree::new(genesis));

        let handles: Vec<_> = (0..4u8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..5 {
                        shared.create_block(owner(i + 2)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Every block was built on the tip at the time, so the chain is linear
        assert_eq!(shared.max_height(), 21);
        assert_eq!(shared.with_tree(|tree| tree.main_chain().len()), 21);
    }

    #[test]
    fn test_reads_are_copies() {
        let genesis = Block::genesis(vec![TransactionOutput::new(owner(1), 10)]);
        let reward = genesis.reward.outpoint(0);
        let shared = SharedBlockTree::new(BlockTree::new(genesis));

        let mut utxo_set = shared.max_height_utxo_set();
        utxo_set.remove(&reward).unwrap();

        assert!(shared.max_height_utxo_set().contains(&reward));
    }
}
