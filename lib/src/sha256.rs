//! SHA-256 digests used as transaction ids and block hashes.
//!
//! A [`Hash`] is always recomputed from the bytes handed to it — nothing
//! here caches a digest inside a `Transaction` or `Block`.

use std::fmt;

/// A 32-byte SHA-256 digest. `TxId` and `BlockHash` are both this type;
/// the name used at a call site is just documentation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; 32]);

pub type TxId = Hash;
pub type BlockHash = Hash;

/// Sentinel `prev_hash` of the first real block, and the `latest_hash`
/// of a node with an empty chain.
pub const GENESIS_BLOCK_PREV: Hash = Hash([0u8; 32]);

impl Hash {
    /// Hashes an arbitrary byte string with SHA-256.
    ///
    /// Transaction and block identities are defined as the SHA-256 of a
    /// specific byte concatenation (see `Transaction::txid` and
    /// `Block::block_hash`), not of a generic serialized form — callers
    /// build that concatenation and pass it here.
    pub fn hash_bytes(bytes: &[u8]) -> Self {
        let hex_digest = sha256::digest(bytes);
        let raw = hex::decode(&hex_digest).expect("sha256 crate returns valid hex");
        let array: [u8; 32] = raw
            .try_into()
            .expect("sha256 digest is always 32 bytes");
        Hash(array)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
