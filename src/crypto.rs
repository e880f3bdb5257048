//! Canonical encoding, digests and ECDSA signatures
//!
//! Identity digests (transactions, blocks) are double SHA-256 over the canonical
//! encoding. The signable digest is a single SHA-256 over the encoding with every
//! input signature left out, so a signature never covers itself.

use crate::error::{LedgerError, Result};
use crate::types::*;
use bitcoin_hashes::{sha256d, Hash as BitcoinHash};
use secp256k1::{ecdsa::Signature, Context, Message, PublicKey, Secp256k1, SecretKey, Signing, Verification};
use sha2::{Digest, Sha256};

const GENESIS_MARKER: &[u8] = b"genesis";

fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

fn encode_transaction(tx: &Transaction, with_signatures: bool) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + tx.inputs.len() * 112 + tx.outputs.len() * 45);

    match &tx.anchor {
        Some(anchor) => {
            buf.push(1);
            buf.extend_from_slice(anchor);
        }
        None => buf.push(0),
    }

    buf.extend_from_slice(&(tx.inputs.len() as u32).to_le_bytes());
    for input in &tx.inputs {
        buf.extend_from_slice(&input.prevout.hash);
        buf.extend_from_slice(&input.prevout.index.to_le_bytes());
        if with_signatures {
            write_bytes(&mut buf, &input.signature);
        }
    }

    buf.extend_from_slice(&(tx.outputs.len() as u32).to_le_bytes());
    for output in &tx.outputs {
        buf.extend_from_slice(&output.value.to_le_bytes());
        write_bytes(&mut buf, output.owner.as_bytes());
    }

    buf
}

fn double_sha256(data: &[u8]) -> Hash {
    sha256d::Hash::hash(data).into_inner()
}

impl Transaction {
    /// Canonical encoding without input signatures
    pub fn signable_bytes(&self) -> Vec<u8> {
        encode_transaction(self, false)
    }

    /// Canonical encoding including input signatures
    pub fn raw_bytes(&self) -> Vec<u8> {
        encode_transaction(self, true)
    }

    /// Digest every input signature commits to
    pub fn signable_digest(&self) -> Hash {
        Sha256::digest(self.signable_bytes()).into()
    }

    /// Digest under which this transaction's outputs are referenced
    pub fn identity_digest(&self) -> Hash {
        double_sha256(&self.raw_bytes())
    }

    /// Sign input `index` with `secret_key`.
    pub fn sign_input(&mut self, index: usize, secret_key: &SecretKey) -> Result<()> {
        let secp = Secp256k1::signing_only();
        let digest = self.signable_digest();
        let input = self
            .inputs
            .get_mut(index)
            .ok_or(LedgerError::InputIndexOutOfRange(index))?;
        input.signature = sign_digest(&secp, &digest, secret_key)?;
        Ok(())
    }

    /// Sign every input with the same key.
    pub fn sign_all(&mut self, secret_key: &SecretKey) -> Result<()> {
        let secp = Secp256k1::signing_only();
        let digest = self.signable_digest();
        let signature = sign_digest(&secp, &digest, secret_key)?;
        for input in &mut self.inputs {
            input.signature = signature.clone();
        }
        Ok(())
    }
}

impl Block {
    /// Block digest: parent digest (or genesis marker) followed by the identity
    /// digests of the reward and each ordinary transaction.
    pub fn digest(&self) -> Hash {
        let mut buf = Vec::with_capacity(40 + 32 * (self.transactions.len() + 1));
        match &self.prev_block_hash {
            Some(prev) => buf.extend_from_slice(prev),
            None => buf.extend_from_slice(GENESIS_MARKER),
        }
        buf.extend_from_slice(&self.reward.identity_digest());
        for tx in &self.transactions {
            buf.extend_from_slice(&tx.identity_digest());
        }
        double_sha256(&buf)
    }
}

/// Produce a DER signature over a 32-byte digest.
pub fn sign_digest<C: Signing>(secp: &Secp256k1<C>, digest: &Hash, secret_key: &SecretKey) -> Result<ByteString> {
    let message = Message::from_digest_slice(digest)
        .map_err(|e| LedgerError::Crypto(e.to_string()))?;
    Ok(secp.sign_ecdsa(&message, secret_key).serialize_der().to_vec())
}

/// Verify a DER signature over `digest` against an owner identity.
///
/// Any malformed identity or signature verifies as false.
pub fn verify_signature<C: Context + Verification>(
    secp: &Secp256k1<C>,
    digest: &Hash,
    signature_bytes: &[u8],
    identity: &Identity,
) -> bool {
    let pubkey = match PublicKey::from_slice(identity.as_bytes()) {
        Ok(pk) => pk,
        Err(_) => return false,
    };

    let signature = match Signature::from_der(signature_bytes) {
        Ok(sig) => sig,
        Err(_) => return false,
    };

    let message = match Message::from_digest_slice(digest) {
        Ok(msg) => msg,
        Err(_) => return false,
    };

    secp.verify_ecdsa(&message, &signature, &pubkey).is_ok()
}

/// Identity owning `secret_key`
pub fn identity_of(secret_key: &SecretKey) -> Identity {
    let secp = Secp256k1::signing_only();
    Identity::from_public_key(&PublicKey::from_secret_key(&secp, secret_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> SecretKey {
        SecretKey::from_slice(&[byte; 32]).unwrap()
    }

    fn spend(prev: Hash, owner: &Identity) -> Transaction {
        Transaction::new(
            vec![TransactionInput::unsigned(OutPoint::new(prev, 0))],
            vec![TransactionOutput::new(owner.clone(), 5)],
        )
    }

    #[test]
    fn test_signable_bytes_ignore_signatures() {
        let owner = identity_of(&key(1));
        let unsigned = spend([7; 32], &owner);
        let mut signed = unsigned.clone();
        signed.sign_all(&key(1)).unwrap();

        assert_eq!(unsigned.signable_digest(), signed.signable_digest());
        assert_ne!(unsigned.identity_digest(), signed.identity_digest());
    }

    #[test]
    fn test_sign_and_verify() {
        let owner = identity_of(&key(2));
        let mut tx = spend([1; 32], &owner);
        tx.sign_input(0, &key(2)).unwrap();

        let secp = Secp256k1::verification_only();
        let digest = tx.signable_digest();
        assert!(verify_signature(&secp, &digest, &tx.inputs[0].signature, &owner));
        assert!(!verify_signature(&secp, &digest, &tx.inputs[0].signature, &identity_of(&key(3))));
    }

    #[test]
    fn test_verify_rejects_malformed_inputs() {
        let secp = Secp256k1::verification_only();
        let digest = [0u8; 32];
        assert!(!verify_signature(&secp, &digest, &[0x30, 0x01], &identity_of(&key(4))));
        assert!(!verify_signature(&secp, &digest, &[], &Identity(vec![0x02; 5])));
    }

    #[test]
    fn test_sign_input_out_of_range() {
        let mut tx = spend([1; 32], &identity_of(&key(5)));
        assert!(matches!(
            tx.sign_input(3, &key(5)),
            Err(LedgerError::InputIndexOutOfRange(3))
        ));
    }

    #[test]
    fn test_reward_anchor_changes_digest() {
        let owner = identity_of(&key(6));
        let outputs = vec![TransactionOutput::new(owner, 25)];
        let a = Transaction::reward(Some([1; 32]), outputs.clone());
        let b = Transaction::reward(Some([2; 32]), outputs);
        assert_ne!(a.identity_digest(), b.identity_digest());
    }

    #[test]
    fn test_block_digest_depends_on_parent() {
        let owner = identity_of(&key(7));
        let outputs = vec![TransactionOutput::new(owner, 25)];
        let genesis = Block::genesis(outputs.clone());
        let child = Block::new(genesis.digest(), outputs, vec![]);
        assert_ne!(genesis.digest(), child.digest());
        assert_eq!(child.digest(), child.clone().digest());
    }
}
