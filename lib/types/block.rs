use crate::sha256::{BlockHash, Hash};
use crate::types::Transaction;

/// An immutable list of transactions plus the hash of the block it
/// extends. Like [`Transaction`], equality is structural and
/// [`Block::block_hash`] is recomputed on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    prev_hash: BlockHash,
    transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(prev_hash: BlockHash, transactions: Vec<Transaction>) -> Self {
        Block {
            prev_hash,
            transactions,
        }
    }

    pub fn prev_block_hash(&self) -> BlockHash {
        self.prev_hash
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// `SHA256(prev_hash || concat(txid_i))`.
    pub fn block_hash(&self) -> BlockHash {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(self.prev_hash.as_bytes());
        for tx in &self.transactions {
            bytes.extend_from_slice(tx.txid().as_bytes());
        }
        Hash::hash_bytes(&bytes)
    }

    pub fn coinbase(&self) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.is_coinbase())
    }
}
