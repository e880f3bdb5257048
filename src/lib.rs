//! # Ledger-Core
//!
//! A minimal UTXO ledger engine: transaction validation against an unspent-output
//! set, atomic application of transaction batches, and a bounded-depth block tree
//! with fork resolution.
//!
//! ## Architecture
//!
//! The crate is layered, leaves first:
//! - [`utxo`]: the unspent output set
//! - [`transaction`]: validation of one transaction against a UTXO snapshot
//! - [`apply`]: lenient batch application and all-or-nothing block connection
//! - [`mempool`]: transactions waiting for a block
//! - [`blocktree`]: block nodes, fork choice, depth cutoff and pruning
//! - [`sync`]: single-writer wrapper for concurrent hosts
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: every operation is a pure function of its inputs and the tree state
//! 2. **Fixed-point amounts**: all values are `i64` base units with checked arithmetic
//! 3. **Copy on branch**: each block node owns its own UTXO snapshot
//! 4. **Rejections are values**: invalid input is routine, never a panic
//!
//! ## Usage
//!
//! ```rust
//! use ledger_core::*;
//! use secp256k1::SecretKey;
//!
//! let alice = SecretKey::from_slice(&[1; 32]).unwrap();
//! let bob = SecretKey::from_slice(&[2; 32]).unwrap();
//!
//! let genesis = Block::genesis(vec![TransactionOutput::new(identity_of(&alice), 10)]);
//! let coin = genesis.reward.outpoint(0);
//! let mut tree = BlockTree::new(genesis);
//!
//! let mut tx = Transaction::new(
//!     vec![TransactionInput::unsigned(coin)],
//!     vec![TransactionOutput::new(identity_of(&bob), 10)],
//! );
//! tx.sign_input(0, &alice).unwrap();
//! assert!(is_valid_transaction(&tx, &tree.max_height_utxo_set()));
//!
//! let block = Block::new(
//!     tree.max_height_block().digest(),
//!     vec![TransactionOutput::new(identity_of(&alice), 25)],
//!     vec![tx],
//! );
//! assert!(tree.add_block(block));
//! assert_eq!(tree.max_height(), 2);
//! assert_eq!(tree.max_height_utxo_set().balance_of(&identity_of(&bob)), Some(10));
//! ```

pub mod types;
pub mod constants;
pub mod crypto;
pub mod utxo;
pub mod transaction;
pub mod apply;
pub mod mempool;
pub mod blocktree;
pub mod sync;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use crypto::{identity_of, verify_signature};
pub use utxo::UtxoSet;
pub use transaction::{check_transaction, is_valid_transaction};
pub use apply::{apply_transactions, connect_transactions};
pub use mempool::PendingTransactionPool;
pub use blocktree::{BlockNode, BlockTree};
pub use sync::SharedBlockTree;
pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
