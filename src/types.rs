//! Core ledger types

use serde::{Deserialize, Serialize};

/// Hash type: 256-bit digest
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Fixed-point amount in base units (see [`crate::constants::COIN`])
pub type Amount = i64;

/// Block height, genesis is 1
pub type Height = u64;

/// OutPoint: the (source transaction, output index) key of an unspent output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

impl OutPoint {
    pub fn new(hash: Hash, index: u32) -> Self {
        Self { hash, index }
    }
}

impl std::fmt::Display for OutPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", hex::encode(self.hash), self.index)
    }
}

/// Owner identity: a compressed secp256k1 public key.
///
/// Kept as raw bytes so that a malformed identity is representable; it simply
/// never verifies a signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity(pub ByteString);

impl Identity {
    pub fn from_public_key(public_key: &secp256k1::PublicKey) -> Self {
        Self(public_key.serialize().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// Transaction input: the output being spent and the owner's signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prevout: OutPoint,
    pub signature: ByteString,
}

impl TransactionInput {
    /// An input that still needs to be signed.
    pub fn unsigned(prevout: OutPoint) -> Self {
        Self {
            prevout,
            signature: Vec::new(),
        }
    }
}

/// Transaction output; immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: Amount,
    pub owner: Identity,
}

impl TransactionOutput {
    pub fn new(owner: Identity, value: Amount) -> Self {
        Self { value, owner }
    }
}

/// Transaction: ordered inputs and ordered outputs.
///
/// Reward transactions have no inputs and carry the digest of the block they
/// build on as `anchor`, which keeps their identity digests distinct across blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub anchor: Option<Hash>,
}

impl Transaction {
    pub fn new(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Self {
        Self {
            inputs,
            outputs,
            anchor: None,
        }
    }

    /// Reward transaction building on `anchor` (`None` for genesis).
    pub fn reward(anchor: Option<Hash>, outputs: Vec<TransactionOutput>) -> Self {
        Self {
            inputs: Vec::new(),
            outputs,
            anchor,
        }
    }

    pub fn is_reward(&self) -> bool {
        self.inputs.is_empty()
    }

    /// OutPoint of this transaction's `index`-th output
    pub fn outpoint(&self, index: u32) -> OutPoint {
        OutPoint::new(self.identity_digest(), index)
    }
}

/// Block: parent digest, reward transaction and ordinary transactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub prev_block_hash: Option<Hash>,
    pub reward: Transaction,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(prev_block_hash: Hash, reward: Vec<TransactionOutput>, transactions: Vec<Transaction>) -> Self {
        Self {
            prev_block_hash: Some(prev_block_hash),
            reward: Transaction::reward(Some(prev_block_hash), reward),
            transactions,
        }
    }

    pub fn genesis(reward: Vec<TransactionOutput>) -> Self {
        Self {
            prev_block_hash: None,
            reward: Transaction::reward(None, reward),
            transactions: Vec::new(),
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.prev_block_hash.is_none()
    }
}
