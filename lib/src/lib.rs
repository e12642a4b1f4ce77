//! # coinnet - a small UTXO node network
//!
//! Core of a simplified UTXO cryptocurrency: nodes that each keep an
//! independent view of a chain, exchange blocks and transactions, mine
//! cooperatively (no proof-of-work), and converge on the longest
//! validated chain. Every transaction moves exactly one coin.

/// Default cap on transactions per block (one coinbase + `BLOCK_SIZE - 1`
/// from the mempool). Overridable via `NODE_BLOCK_SIZE`, see [`config`].
pub const BLOCK_SIZE: usize = 10;

/// Default bound on how many blocks `notify_of_block` will walk backward
/// from a peer before giving up on a lying or cyclic chain. Overridable
/// via `NODE_MAX_REORG_DEPTH`, see [`config`].
pub const MAX_REORG_DEPTH: usize = 10_000;

/// Number of random bytes used as a coinbase transaction's placeholder
/// signature. Only needs to be `>= 48` so every coinbase gets a unique
/// txid; this implementation uses the original source's more common
/// choice of 64.
pub const COINBASE_SIGNATURE_LEN: usize = 64;

pub mod config;
pub mod crypto;
pub mod error;
pub mod sha256;

#[path = "../types/mod.rs"]
pub mod types;

pub use error::{NodeError, Result};
pub use sha256::{BlockHash, Hash, TxId, GENESIS_BLOCK_PREV};
pub use types::{Block, Node, Transaction};
