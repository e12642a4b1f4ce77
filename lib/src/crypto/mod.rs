//! Key generation, signing and verification for transaction inputs.
//!
//! Coins are spent by signing the id of the transaction being consumed
//! together with the public key of the output being claimed; see
//! [`Signature::sign`].

use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;

use crate::sha256::Hash;


/// An ECDSA (secp256k1) private key.
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    pub fn new_key() -> Self {
        PrivateKey(SigningKey::random(&mut OsRng))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(*self.0.verifying_key())
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new_key()
    }
}

/// An ECDSA public key. Also used as an account's address: whoever holds
/// the matching [`PrivateKey`] can spend a coin's output locked to it.
#[derive(Clone, Copy)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    pub fn to_sec1_bytes(&self) -> Vec<u8> {
        self.0.to_sec1_bytes().into_vec()
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for PublicKey {}

impl std::hash::Hash for PublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_sec1_bytes().hash(state);
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.to_sec1_bytes()))
    }
}

/// A signature over the hash binding an input's `prev_txid` to the
/// public key of the output it spends. Coinbase transactions carry an
/// unverifiable placeholder of the same shape, see
/// [`Signature::random_placeholder`].
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Signs `message_hash` (see `crate::types::transaction::signing_message`)
    /// with `private_key`.
    pub fn sign(message_hash: &Hash, private_key: &PrivateKey) -> Self {
        let sig: EcdsaSignature = private_key.0.sign(message_hash.as_bytes());
        Signature(sig.to_vec())
    }

    /// Checks that this signature was produced by the holder of
    /// `public_key`'s private key over `message_hash`. Always `false`
    /// for a [`Self::random_placeholder`] signature.
    pub fn verify(&self, message_hash: &Hash, public_key: &PublicKey) -> bool {
        let Ok(sig) = EcdsaSignature::from_slice(&self.0) else {
            return false;
        };
        public_key.0.verify(message_hash.as_bytes(), &sig).is_ok()
    }

    /// Random bytes used as a coinbase transaction's signature. A
    /// coinbase has no real input to sign for, but still needs a unique,
    /// unpredictable value so two coinbases in different blocks never
    /// collide on `txid`.
    pub fn random_placeholder(len: usize) -> Self {
        use rand::RngCore;
        let mut bytes = vec![0u8; len];
        OsRng.fill_bytes(&mut bytes);
        Signature(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", hex::encode(&self.0))
    }
}
