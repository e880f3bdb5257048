//! Block tree with bounded-depth fork choice
//!
//! Every attached block becomes a [`BlockNode`] owning the UTXO snapshot that
//! holds right after it. A new block is validated against a copy of its parent's
//! snapshot, so sibling branches never observe each other's spends. Nodes live in
//! a flat digest-keyed arena and point at their parent and children by digest.
//!
//! The deepest node is authoritative. Ties go to the block attached last. A block
//! whose height would be `max_height - cutoff_age` or lower is refused for good,
//! which is what lets nodes far below the tip be pruned.

use crate::apply::{apply_reward, apply_transactions, connect_transactions};
use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::mempool::PendingTransactionPool;
use crate::types::*;
use crate::utxo::UtxoSet;
use log::{debug, info, trace, warn};
use std::collections::{HashMap, HashSet};

/// A committed block and the ledger state right after it.
#[derive(Debug, Clone)]
pub struct BlockNode {
    block: Block,
    hash: Hash,
    parent: Option<Hash>,
    children: Vec<Hash>,
    height: Height,
    // Dropped once the node can no longer be extended
    utxo_set: Option<UtxoSet>,
}

impl BlockNode {
    fn new(block: Block, hash: Hash, parent: Option<Hash>, height: Height, utxo_set: UtxoSet) -> Self {
        Self {
            block,
            hash,
            parent,
            children: Vec::new(),
            height,
            utxo_set: Some(utxo_set),
        }
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    pub fn parent(&self) -> Option<&Hash> {
        self.parent.as_ref()
    }

    pub fn children(&self) -> &[Hash] {
        &self.children
    }

    pub fn height(&self) -> Height {
        self.height
    }

    /// Snapshot after this block; `None` once pruned
    pub fn utxo_set(&self) -> Option<&UtxoSet> {
        self.utxo_set.as_ref()
    }
}

pub struct BlockTree {
    nodes: HashMap<Hash, BlockNode>,
    genesis: Hash,
    max_height_node: Hash,
    pool: PendingTransactionPool,
    config: LedgerConfig,
}

impl BlockTree {
    /// Tree holding only `genesis`, with default configuration.
    pub fn new(genesis: Block) -> Self {
        Self::build(genesis, LedgerConfig::default())
    }

    pub fn with_config(genesis: Block, config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(genesis, config))
    }

    /// The genesis block is trusted: its reward outputs seed the first UTXO set
    /// without any check, and its ordinary transactions are not applied.
    fn build(genesis: Block, config: LedgerConfig) -> Self {
        if !genesis.transactions.is_empty() {
            warn!(
                "ignoring {} ordinary transactions in genesis block",
                genesis.transactions.len()
            );
        }

        let mut utxo_set = UtxoSet::new();
        apply_reward(&genesis.reward, &mut utxo_set);

        let hash = genesis.digest();
        let node = BlockNode::new(genesis, hash, None, 1, utxo_set);
        info!("genesis block {}", hex::encode(hash));

        let mut nodes = HashMap::new();
        nodes.insert(hash, node);

        Self {
            nodes,
            genesis: hash,
            max_height_node: hash,
            pool: PendingTransactionPool::new(),
            config,
        }
    }

    fn max_node(&self) -> &BlockNode {
        // The max-height pointer always names a stored node
        &self.nodes[&self.max_height_node]
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn genesis_hash(&self) -> &Hash {
        &self.genesis
    }

    pub fn max_height_hash(&self) -> &Hash {
        &self.max_height_node
    }

    pub fn max_height(&self) -> Height {
        self.max_node().height
    }

    pub fn max_height_block(&self) -> &Block {
        &self.max_node().block
    }

    /// Independent copy of the UTXO set at the tip of the deepest branch
    pub fn max_height_utxo_set(&self) -> UtxoSet {
        // Tip snapshots are never pruned
        self.max_node().utxo_set.clone().unwrap_or_default()
    }

    pub fn get_node(&self, hash: &Hash) -> Option<&BlockNode> {
        self.nodes.get(hash)
    }

    pub fn get_block(&self, hash: &Hash) -> Option<&Block> {
        self.nodes.get(hash).map(|node| &node.block)
    }

    pub fn height_of(&self, hash: &Hash) -> Option<Height> {
        self.nodes.get(hash).map(|node| node.height)
    }

    pub fn contains_block(&self, hash: &Hash) -> bool {
        self.nodes.contains_key(hash)
    }

    pub fn children_of(&self, hash: &Hash) -> Option<&[Hash]> {
        self.nodes.get(hash).map(|node| node.children.as_slice())
    }

    /// Copy of the snapshot after block `hash`, if the block is known and unpruned
    pub fn utxo_set_at(&self, hash: &Hash) -> Option<UtxoSet> {
        self.nodes.get(hash).and_then(|node| node.utxo_set.clone())
    }

    /// Number of retained nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Digests of the deepest branch, oldest retained block first
    pub fn main_chain(&self) -> Vec<Hash> {
        let mut chain = Vec::with_capacity(self.max_height() as usize);
        let mut cursor = Some(self.max_height_node);
        while let Some(hash) = cursor {
            chain.push(hash);
            cursor = self.nodes.get(&hash).and_then(|node| node.parent);
        }
        chain.reverse();
        chain
    }

    pub fn transaction_pool(&self) -> &PendingTransactionPool {
        &self.pool
    }

    /// Queue `tx` for a future block. No validation happens here.
    pub fn add_transaction(&mut self, tx: Transaction) {
        let tx_id = self.pool.insert(tx);
        trace!("pending transaction {}", hex::encode(tx_id));
    }

    /// Attach `block` if valid. Returns `true` iff it was attached.
    pub fn add_block(&mut self, block: Block) -> bool {
        match self.try_add_block(block) {
            Ok(_) => true,
            Err(e) => {
                debug!("block rejected: {}", e);
                false
            }
        }
    }

    /// AddBlock: ℬ → {attached, rejected}
    ///
    /// 1. The block must name a parent (no second genesis) and its reward
    ///    transaction must have no inputs
    /// 2. The parent must be a known node
    /// 3. height = parent.height + 1 must exceed max_height - cutoff_age
    /// 4. Every ordinary transaction must connect, in order, to a copy of the
    ///    parent's UTXO set
    /// 5. Reward outputs are added unchecked
    /// 6. Committed transactions leave the pending pool
    /// 7. The node is attached; it becomes the tip if height ≥ max_height
    ///
    /// A rejected block leaves no trace. Returns the attached block's digest.
    pub fn try_add_block(&mut self, block: Block) -> Result<Hash> {
        // 1. No second genesis, and the reward spends nothing
        let prev = block.prev_block_hash.ok_or(LedgerError::SecondGenesis)?;
        if !block.reward.is_reward() {
            return Err(LedgerError::RewardWithInputs(block.reward.inputs.len()));
        }

        // 2. Parent must exist
        let parent = self
            .nodes
            .get(&prev)
            .ok_or(LedgerError::UnknownParent(prev))?;

        let hash = block.digest();
        if self.nodes.contains_key(&hash) {
            return Err(LedgerError::DuplicateBlock(hash));
        }

        // 3. Depth cutoff
        let height = parent.height + 1;
        let max_height = self.max_height();
        if height <= max_height.saturating_sub(self.config.cutoff_age) {
            return Err(LedgerError::BeyondCutoff {
                height,
                max_height,
                cutoff_age: self.config.cutoff_age,
            });
        }

        // 4. All-or-nothing connection on a copy of the parent snapshot
        let parent_utxo_set = parent
            .utxo_set
            .clone()
            .ok_or(LedgerError::PrunedParent(prev))?;
        let mut utxo_set = connect_transactions(&block.transactions, parent_utxo_set)?;

        // 5. Reward outputs
        apply_reward(&block.reward, &mut utxo_set);

        // 6. Drop committed transactions from the pool
        self.pool.remove_block(&block);

        // 7. Attach
        let tx_count = block.transactions.len();
        let node = BlockNode::new(block, hash, Some(prev), height, utxo_set);
        self.nodes.insert(hash, node);
        if let Some(parent) = self.nodes.get_mut(&prev) {
            parent.children.push(hash);
        }

        if height >= max_height {
            self.max_height_node = hash;
        }
        info!(
            "attached block {} at height {} with {} transactions (max height {})",
            hex::encode(hash),
            height,
            tx_count,
            self.max_height()
        );

        if self.config.prune {
            self.prune();
        }

        Ok(hash)
    }

    /// Lenient selection of pending transactions for a block on the tip.
    ///
    /// Pool transactions are applied in insertion order to a copy of the tip's
    /// UTXO set; invalid ones are skipped. The pool itself is unchanged.
    pub fn propose_transactions(&self) -> Vec<Transaction> {
        let mut utxo_set = self.max_height_utxo_set();
        apply_transactions(&self.pool.transactions(), &mut utxo_set)
    }

    /// Build a block on the tip from [`BlockTree::propose_transactions`], paying
    /// the configured reward to `reward_owner`, and attach it.
    pub fn create_block(&mut self, reward_owner: Identity) -> Result<Block> {
        let block = Block::new(
            self.max_height_node,
            vec![TransactionOutput::new(reward_owner, self.config.block_reward)],
            self.propose_transactions(),
        );
        self.try_add_block(block.clone())?;
        Ok(block)
    }

    /// Drop state that can no longer matter.
    ///
    /// A node at height h can be extended only while h ≥ max_height - cutoff_age.
    /// Nodes below that line that are ancestors of an extendable node lose their
    /// snapshot; all other nodes below it are removed.
    fn prune(&mut self) -> usize {
        let min_extendable = self.max_height().saturating_sub(self.config.cutoff_age);
        if min_extendable <= 1 {
            return 0;
        }

        let mut retained: HashSet<Hash> = HashSet::new();
        for node in self.nodes.values().filter(|n| n.height >= min_extendable) {
            let mut cursor = Some(node.hash);
            while let Some(hash) = cursor {
                if !retained.insert(hash) {
                    break;
                }
                cursor = self.nodes.get(&hash).and_then(|n| n.parent);
            }
        }

        let doomed: Vec<Hash> = self
            .nodes
            .keys()
            .filter(|hash| !retained.contains(*hash))
            .copied()
            .collect();

        for hash in &doomed {
            if let Some(node) = self.nodes.remove(hash) {
                trace!("pruned block {} at height {}", hex::encode(hash), node.height);
                if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
                    parent.children.retain(|child| child != hash);
                }
            }
        }

        for node in self.nodes.values_mut() {
            if node.height < min_extendable && node.utxo_set.is_some() {
                node.utxo_set = None;
            }
        }

        doomed.len()
    }
}
