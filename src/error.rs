//! Error types for ledger validation

use crate::types::{Amount, Hash, Height, OutPoint};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("UTXO not found: {0}")]
    UtxoNotFound(OutPoint),

    #[error("UTXO claimed more than once: {0}")]
    DuplicateInput(OutPoint),

    #[error("Invalid signature at input {0}")]
    InvalidSignature(usize),

    #[error("Negative output value {value} at index {index}")]
    NegativeOutput { index: usize, value: Amount },

    #[error("Insufficient input value: inputs {inputs}, outputs {outputs}")]
    InsufficientInputValue { inputs: Amount, outputs: Amount },

    #[error("Transaction has no inputs")]
    EmptyInputs,

    #[error("Amount overflow")]
    AmountOverflow,

    #[error("Input index {0} out of range")]
    InputIndexOutOfRange(usize),

    #[error("Block has no parent reference: a second genesis is not permitted")]
    SecondGenesis,

    #[error("Unknown parent block {}", hex::encode(.0))]
    UnknownParent(Hash),

    #[error("Block {} already attached", hex::encode(.0))]
    DuplicateBlock(Hash),

    #[error("Block height {height} is too far behind max height {max_height} (cutoff age {cutoff_age})")]
    BeyondCutoff {
        height: Height,
        max_height: Height,
        cutoff_age: Height,
    },

    #[error("Reward transaction has {0} inputs")]
    RewardWithInputs(usize),

    #[error("Parent block {} no longer holds a UTXO snapshot", hex::encode(.0))]
    PrunedParent(Hash),

    #[error("Invalid transaction at index {index}: {reason}")]
    InvalidBlockTransaction { index: usize, reason: Box<LedgerError> },

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
