//! Transaction validation against a UTXO snapshot

use crate::crypto::verify_signature;
use crate::error::{LedgerError, Result};
use crate::types::*;
use crate::utxo::UtxoSet;
use secp256k1::Secp256k1;
use std::collections::HashSet;

/// CheckTransaction: 𝒯𝒳 × 𝒰𝒮 → {valid, invalid} × ℤ
///
/// A transaction tx = (ins, outs) is valid against us if and only if:
/// 0. |ins| > 0 (only reward transactions create value from nothing)
/// 1. ∀i ∈ ins: i.prevout ∈ us
/// 2. no prevout is claimed twice within ins
/// 3. ∀i ∈ ins: i.signature verifies the signable digest of tx under us(i.prevout).owner
/// 4. ∀o ∈ outs: o.value ≥ 0
/// 5. Σᵢ us(i.prevout).value ≥ Σₒ o.value
///
/// Returns the fee (input total minus output total), or the first rule broken.
/// Pure: `utxo_set` is only read.
pub fn check_transaction(tx: &Transaction, utxo_set: &UtxoSet) -> Result<Amount> {
    // 0. Spending nothing would let the same outputs be recreated forever
    if tx.inputs.is_empty() {
        return Err(LedgerError::EmptyInputs);
    }

    let secp = Secp256k1::verification_only();
    let digest = tx.signable_digest();
    let mut claimed = HashSet::with_capacity(tx.inputs.len());
    let mut total_input_value: Amount = 0;

    for (i, input) in tx.inputs.iter().enumerate() {
        // 1. Referenced output must be unspent
        let utxo = utxo_set.lookup(&input.prevout)?;

        // 2. No UTXO claimed multiple times by tx
        if !claimed.insert(input.prevout) {
            return Err(LedgerError::DuplicateInput(input.prevout));
        }

        // 3. Signature by the output's owner
        if !verify_signature(&secp, &digest, &input.signature, &utxo.owner) {
            return Err(LedgerError::InvalidSignature(i));
        }

        total_input_value = total_input_value
            .checked_add(utxo.value)
            .ok_or(LedgerError::AmountOverflow)?;
    }

    // 4. Output values are non-negative
    let mut total_output_value: Amount = 0;
    for (index, output) in tx.outputs.iter().enumerate() {
        if output.value < 0 {
            return Err(LedgerError::NegativeOutput {
                index,
                value: output.value,
            });
        }
        total_output_value = total_output_value
            .checked_add(output.value)
            .ok_or(LedgerError::AmountOverflow)?;
    }

    // 5. No value created
    if total_input_value < total_output_value {
        return Err(LedgerError::InsufficientInputValue {
            inputs: total_input_value,
            outputs: total_output_value,
        });
    }

    Ok(total_input_value - total_output_value)
}

/// `true` iff [`check_transaction`] accepts `tx` against `utxo_set`.
pub fn is_valid_transaction(tx: &Transaction, utxo_set: &UtxoSet) -> bool {
    check_transaction(tx, utxo_set).is_ok()
}

/// Fee paid by `tx` against `utxo_set`, if valid
pub fn transaction_fee(tx: &Transaction, utxo_set: &UtxoSet) -> Option<Amount> {
    check_transaction(tx, utxo_set).ok()
}
