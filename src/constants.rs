//! Ledger constants

/// Base units per coin
pub const COIN: i64 = 100_000_000;

/// Number of blocks a branch may lag behind the deepest branch and still be extended
pub const CUTOFF_AGE: u64 = 10;

/// Reward paid by blocks built with `BlockTree::create_block`
pub const DEFAULT_BLOCK_REWARD: i64 = 25 * COIN;
