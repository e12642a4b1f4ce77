use crate::crypto::{PrivateKey, PublicKey, Signature};
use crate::sha256::{Hash, TxId};

/// A single coin transfer. `input == None` marks a coinbase (money
/// creation); every other transaction consumes exactly one UTXO and
/// produces exactly one new one.
///
/// Value equality and `txid` are both structural: nothing here is
/// cached, so reordering or duplicating a transaction's fields always
/// recomputes the same id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub output: PublicKey,
    pub input: Option<TxId>,
    pub signature: Signature,
}

impl Transaction {
    pub fn new(output: PublicKey, input: Option<TxId>, signature: Signature) -> Self {
        Transaction {
            output,
            input,
            signature,
        }
    }

    /// Mints a coin for `output`. The signature is an unverifiable
    /// random placeholder; its only job is to make the coinbase's txid
    /// unique across blocks.
    pub fn coinbase(output: PublicKey) -> Self {
        Transaction {
            output,
            input: None,
            signature: Signature::random_placeholder(crate::COINBASE_SIGNATURE_LEN),
        }
    }

    pub fn is_coinbase(&self) -> bool {
        self.input.is_none()
    }

    /// `SHA256(input_bytes || output || signature)`, recomputed every
    /// call. `input_bytes` is empty for a coinbase.
    pub fn txid(&self) -> TxId {
        let mut bytes = Vec::new();
        if let Some(input) = &self.input {
            bytes.extend_from_slice(input.as_bytes());
        }
        bytes.extend_from_slice(&self.output.to_sec1_bytes());
        bytes.extend_from_slice(self.signature.as_bytes());
        Hash::hash_bytes(&bytes)
    }

    /// Builds a non-coinbase transaction spending `input_utxo` to
    /// `target`, signed by `signer`.
    pub fn spend(input_utxo: &Transaction, target: PublicKey, signer: &PrivateKey) -> Self {
        let input = input_utxo.txid();
        let message = signing_message(&input, &target);
        let signature = Signature::sign(&message, signer);
        Transaction {
            output: target,
            input: Some(input),
            signature,
        }
    }

    /// Checks this transaction's signature against the public key that
    /// owns `input_utxo`, the UTXO it claims to spend. Always `false`
    /// for a coinbase (nothing to verify: `verify` requires an input).
    pub fn verify_signature(&self, input_utxo: &Transaction) -> bool {
        let Some(input) = &self.input else {
            return false;
        };
        let message = signing_message(input, &self.output);
        self.signature.verify(&message, &input_utxo.output)
    }
}

/// The message an input's spender signs: `input_txid || output_pubkey`.
/// Binding both fields prevents an attacker from redirecting a signed
/// transaction's output to a different address.
pub fn signing_message(input: &TxId, output: &PublicKey) -> Hash {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(input.as_bytes());
    bytes.extend_from_slice(&output.to_sec1_bytes());
    Hash::hash_bytes(&bytes)
}
