//! Applying transactions to a UTXO set
//!
//! Two modes share the same per-transaction step:
//! - [`apply_transactions`] is lenient: invalid candidates are skipped silently.
//! - [`connect_transactions`] is all-or-nothing: the first invalid transaction
//!   rejects the whole list.

use crate::error::{LedgerError, Result};
use crate::transaction::{check_transaction, is_valid_transaction};
use crate::types::*;
use crate::utxo::UtxoSet;
use log::trace;

/// ApplyTransaction: 𝒯𝒳 × 𝒰𝒮 → 𝒰𝒮
///
/// us' = (us \ {i.prevout : i ∈ tx.inputs}) ∪ {(tx.id, i) ↦ tx.outputs[i]}
///
/// The caller must have validated `tx` against `utxo_set`.
pub fn apply_transaction(tx: &Transaction, utxo_set: &mut UtxoSet) {
    for input in &tx.inputs {
        let removed = utxo_set.remove(&input.prevout);
        debug_assert!(removed.is_ok(), "applied an unvalidated input {}", input.prevout);
    }
    utxo_set.add_outputs(tx);
}

/// Greedy single-pass batch application.
///
/// Candidates are taken in order. Each is validated against the current state of
/// `utxo_set`, so an accepted transaction may spend outputs of an earlier accepted
/// one and may also starve a later candidate of the output it needs. Invalid
/// candidates leave no trace. Returns the accepted transactions in order.
pub fn apply_transactions(candidates: &[Transaction], utxo_set: &mut UtxoSet) -> Vec<Transaction> {
    let mut accepted = Vec::with_capacity(candidates.len());

    for tx in candidates {
        if !is_valid_transaction(tx, utxo_set) {
            trace!("skipping invalid candidate {}", hex::encode(tx.identity_digest()));
            continue;
        }
        apply_transaction(tx, utxo_set);
        accepted.push(tx.clone());
    }

    accepted
}

/// ConnectTransactions: 𝒯𝒳* × 𝒰𝒮 → {valid, invalid} × 𝒰𝒮
///
/// Applies every transaction in order; all must be individually and mutually
/// valid. Consumes the working set and returns it updated, or the index and
/// reason of the first failure.
pub fn connect_transactions(transactions: &[Transaction], mut utxo_set: UtxoSet) -> Result<UtxoSet> {
    for (index, tx) in transactions.iter().enumerate() {
        if let Err(reason) = check_transaction(tx, &utxo_set) {
            return Err(LedgerError::InvalidBlockTransaction {
                index,
                reason: Box::new(reason),
            });
        }
        apply_transaction(tx, &mut utxo_set);
    }
    Ok(utxo_set)
}

/// Add the outputs of a reward transaction without balance or signature checks.
pub fn apply_reward(reward: &Transaction, utxo_set: &mut UtxoSet) {
    utxo_set.add_outputs(reward);
}
