use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, instrument, trace, warn};

use crate::config::NodeLimits;
use crate::crypto::{PrivateKey, PublicKey};
use crate::error::{NodeError, Result};
use crate::sha256::{BlockHash, TxId, GENESIS_BLOCK_PREV};
use crate::types::{Block, Transaction};

struct Inner {
    chain: Vec<Block>,
    utxo: IndexMap<TxId, Transaction>,
    mempool: Vec<Transaction>,
    peers: HashSet<Node>,
    latest_hash: BlockHash,
    private_key: PrivateKey,
    public_key: PublicKey,
}

/// A peer in the network. Cheap to clone: clones share the same
/// underlying state, the way a socket handle would share a connection.
///
/// Node is deliberately `Rc<RefCell<..>>`, not `Arc<Mutex<..>>` — the
/// network is single-threaded and re-entrant by design (see module
/// docs), so an atomically-refcounted, lock-guarded handle would
/// misrepresent the concurrency contract rather than enforce it.
#[derive(Clone)]
pub struct Node(Rc<RefCell<Inner>>);

impl Node {
    /// A node with an empty chain, empty mempool, no peers and a fresh
    /// keypair.
    pub fn new() -> Self {
        let private_key = PrivateKey::new_key();
        let public_key = private_key.public_key();
        Node(Rc::new(RefCell::new(Inner {
            chain: Vec::new(),
            utxo: IndexMap::new(),
            mempool: Vec::new(),
            peers: HashSet::new(),
            latest_hash: GENESIS_BLOCK_PREV,
            private_key,
            public_key,
        })))
    }

    /// Builds a node whose chain is exactly `chain`, with no validation
    /// performed. Intended for tests that need a peer serving a
    /// scripted (possibly malformed) chain without going through
    /// `mine_block`; a well-behaved node should never construct itself
    /// this way.
    pub fn from_chain(chain: Vec<Block>) -> Self {
        let mut utxo = IndexMap::new();
        for block in &chain {
            fold_block_into_utxo(&mut utxo, block);
        }
        let latest_hash = chain.last().map(Block::block_hash).unwrap_or(GENESIS_BLOCK_PREV);
        let private_key = PrivateKey::new_key();
        let public_key = private_key.public_key();
        Node(Rc::new(RefCell::new(Inner {
            chain,
            utxo,
            mempool: Vec::new(),
            peers: HashSet::new(),
            latest_hash,
            private_key,
            public_key,
        })))
    }

    // --- peer management -------------------------------------------------

    /// Connects this node to `other`. Idempotent; rejects connecting a
    /// node to itself. After the edge is established both sides notify
    /// each other of their current tip, so whichever has the longer
    /// chain propagates it to the other.
    #[instrument(skip_all)]
    pub fn connect(&self, other: &Node) -> Result<()> {
        if self == other {
            return Err(NodeError::SelfConnection);
        }
        self.0.borrow_mut().peers.insert(other.clone());
        other.0.borrow_mut().peers.insert(self.clone());
        debug!("connected");

        let self_hash = self.get_latest_hash();
        let other_hash = other.get_latest_hash();
        other.notify_of_block(self_hash, self);
        self.notify_of_block(other_hash, other);
        Ok(())
    }

    /// Symmetric removal; a no-op if the two nodes are not connected.
    pub fn disconnect_from(&self, other: &Node) {
        self.0.borrow_mut().peers.remove(other);
        other.0.borrow_mut().peers.remove(self);
    }

    pub fn get_connections(&self) -> HashSet<Node> {
        self.0.borrow().peers.clone()
    }

    // --- mempool -----------------------------------------------------------

    /// Admits `tx` to the mempool and forwards it to every peer that
    /// does not already carry it. Returns whether `tx` is in the
    /// mempool after the call (so a second call with the same tx
    /// returns `true` without duplicating it).
    #[instrument(skip_all)]
    pub fn add_transaction_to_mempool(&self, tx: Transaction) -> bool {
        if self.mempool_contains(&tx) {
            return true;
        }
        if !self.can_admit_to_mempool(&tx) {
            return false;
        }
        self.0.borrow_mut().mempool.push(tx.clone());
        trace!(txid = %tx.txid(), "admitted to mempool");

        for peer in self.get_connections() {
            if !peer.mempool_contains(&tx) {
                peer.add_transaction_to_mempool(tx.clone());
            }
        }
        true
    }

    fn mempool_contains(&self, tx: &Transaction) -> bool {
        let txid = tx.txid();
        self.0.borrow().mempool.iter().any(|t| t.txid() == txid)
    }

    /// Mempool admission rules from a candidate transaction against the
    /// node's *current* state: coinbases can only enter via mining, the
    /// claimed input must be an unspent UTXO, the signature must verify
    /// against that UTXO's owner, and no other mempool entry may
    /// already spend the same input.
    fn can_admit_to_mempool(&self, tx: &Transaction) -> bool {
        let Some(input) = tx.input else {
            return false;
        };
        let inner = self.0.borrow();
        let Some(input_utxo) = inner.utxo.get(&input) else {
            return false;
        };
        if !tx.verify_signature(input_utxo) {
            return false;
        }
        !inner.mempool.iter().any(|t| t.input == Some(input))
    }

    pub fn get_mempool(&self) -> Vec<Transaction> {
        self.0.borrow().mempool.clone()
    }

    /// Empties the local mempool only; peers are not notified. Lets a
    /// client abandon a pending spend and immediately try another one
    /// from the same coin.
    pub fn clear_mempool(&self) {
        self.0.borrow_mut().mempool.clear();
    }

    // --- mining --------------------------------------------------------

    /// Mines a block from a coinbase plus up to `block_size - 1`
    /// mempool transactions (FIFO), applies it locally and notifies
    /// every peer. There is no proof-of-work, so this always succeeds.
    #[instrument(skip_all)]
    pub fn mine_block(&self) -> BlockHash {
        let block_size = NodeLimits::global().block_size;
        let block = {
            let inner = self.0.borrow();
            let coinbase = Transaction::coinbase(inner.public_key);
            let take_n = block_size.saturating_sub(1);
            let mut transactions = Vec::with_capacity(take_n + 1);
            transactions.push(coinbase);
            transactions.extend(inner.mempool.iter().take(take_n).cloned());
            Block::new(inner.latest_hash, transactions)
        };
        let new_hash = self.apply_block(block);
        debug!(hash = %new_hash, "mined block");

        for peer in self.get_connections() {
            peer.notify_of_block(new_hash, self);
        }
        new_hash
    }

    /// Appends `block` to the local chain and folds it into the UTXO
    /// set and mempool (§4.6). Caller is responsible for having
    /// validated the block already.
    fn apply_block(&self, block: Block) -> BlockHash {
        let mut inner = self.0.borrow_mut();
        fold_block_into_utxo(&mut inner.utxo, &block);
        let confirmed: HashSet<TxId> = block.transactions().iter().map(Transaction::txid).collect();
        inner.mempool.retain(|t| !confirmed.contains(&t.txid()));
        let hash = block.block_hash();
        inner.chain.push(block);
        inner.latest_hash = hash;
        hash
    }

    // --- chain queries ---------------------------------------------------

    pub fn get_block(&self, hash: BlockHash) -> Result<Block> {
        self.0
            .borrow()
            .chain
            .iter()
            .find(|b| b.block_hash() == hash)
            .cloned()
            .ok_or(NodeError::UnknownBlock(hash))
    }

    pub fn get_latest_hash(&self) -> BlockHash {
        self.0.borrow().latest_hash
    }

    pub fn get_utxo(&self) -> Vec<Transaction> {
        self.0.borrow().utxo.values().cloned().collect()
    }

    fn has_block(&self, hash: BlockHash) -> bool {
        self.0.borrow().chain.iter().any(|b| b.block_hash() == hash)
    }

    fn chain_index_of(&self, hash: BlockHash) -> Option<usize> {
        self.0.borrow().chain.iter().position(|b| b.block_hash() == hash)
    }

    fn chain_len(&self) -> usize {
        self.0.borrow().chain.len()
    }

    // --- chain extension & reorg ------------------------------------------

    /// Learns of a new tip `hash` from `sender` and, if the chain it
    /// heads is strictly longer than the local one past their common
    /// ancestor, adopts it (§4.5). Silent no-op on anything short of
    /// that: already-known tip, a chain that doesn't root at genesis, a
    /// lying peer, or a tail that isn't longer.
    #[instrument(skip_all)]
    pub fn notify_of_block(&self, hash: BlockHash, sender: &Node) {
        if hash == GENESIS_BLOCK_PREV || self.has_block(hash) {
            return;
        }

        let max_depth = NodeLimits::global().max_reorg_depth;
        let mut fetched = Vec::new();
        let mut current = hash;
        let fork_hash;
        loop {
            if fetched.len() >= max_depth {
                warn!("peer chain exceeded max reorg depth, aborting");
                return;
            }
            if current == GENESIS_BLOCK_PREV {
                fork_hash = None;
                break;
            }
            if self.has_block(current) {
                fork_hash = Some(current);
                break;
            }
            let Ok(block) = sender.get_block(current) else {
                return;
            };
            if block.block_hash() != current {
                warn!("peer served a block with a mismatched hash, aborting");
                return;
            }
            let prev = block.prev_block_hash();
            fetched.push(block);
            current = prev;
        }
        fetched.reverse();

        let fork_index: isize = match fork_hash {
            None => -1,
            Some(h) => match self.chain_index_of(h) {
                Some(i) => i as isize,
                None => return,
            },
        };
        let local_tail_len = self.chain_len() as isize - (fork_index + 1);
        let new_tail_len = fetched.len() as isize;
        if new_tail_len <= local_tail_len {
            return;
        }

        let mempool_snapshot = self.get_mempool();
        self.rebuild_chain_to_fork(fork_index);
        self.0.borrow_mut().mempool.clear();

        let mut applied = 0usize;
        for block in &fetched {
            let valid = validate_block(block, &self.0.borrow().utxo);
            if !valid {
                warn!("reorg candidate block failed validation, stopping application");
                break;
            }
            let new_hash = self.apply_block(block.clone());
            applied += 1;

            for peer in self.get_connections() {
                if &peer != sender {
                    peer.notify_of_block(new_hash, self);
                }
            }
        }
        debug!(applied, requested = fetched.len(), "reorg complete");

        let confirmed: HashSet<TxId> = fetched[..applied]
            .iter()
            .flat_map(|b| b.transactions().iter().map(Transaction::txid))
            .collect();
        for tx in mempool_snapshot {
            if confirmed.contains(&tx.txid()) {
                continue;
            }
            if self.can_admit_to_mempool(&tx) {
                self.0.borrow_mut().mempool.push(tx);
            }
        }
    }

    /// Truncates the chain down to (and including) `fork_index` and
    /// rebuilds the UTXO set by replaying the kept blocks from an empty
    /// set. `fork_index == -1` truncates to genesis.
    fn rebuild_chain_to_fork(&self, fork_index: isize) {
        let mut inner = self.0.borrow_mut();
        let keep = if fork_index < 0 { 0 } else { (fork_index + 1) as usize };
        inner.chain.truncate(keep);
        inner.utxo.clear();
        inner.latest_hash = inner
            .chain
            .last()
            .map(Block::block_hash)
            .unwrap_or(GENESIS_BLOCK_PREV);
        let chain = inner.chain.clone();
        for block in &chain {
            fold_block_into_utxo(&mut inner.utxo, block);
        }
    }

    // --- wallet-style operations -----------------------------------------

    /// Scans owned UTXOs in insertion order and spends the first one
    /// not already claimed by a pending mempool transaction (§4.2).
    /// Returns `None` if every owned UTXO is already being spent or
    /// mempool admission of the built transaction fails.
    #[instrument(skip_all)]
    pub fn create_transaction(&self, target: PublicKey) -> Option<Transaction> {
        let (owned, private_key) = {
            let inner = self.0.borrow();
            let owned: Vec<Transaction> = inner
                .utxo
                .values()
                .filter(|t| t.output == inner.public_key)
                .cloned()
                .collect();
            (owned, inner.private_key.clone())
        };

        for input_utxo in owned {
            let already_spending = {
                let input = input_utxo.txid();
                self.0.borrow().mempool.iter().any(|t| t.input == Some(input))
            };
            if already_spending {
                continue;
            }
            let tx = Transaction::spend(&input_utxo, target, &private_key);
            if self.add_transaction_to_mempool(tx.clone()) {
                return Some(tx);
            }
        }
        None
    }

    pub fn get_balance(&self) -> usize {
        let inner = self.0.borrow();
        inner.utxo.values().filter(|t| t.output == inner.public_key).count()
    }

    pub fn get_address(&self) -> PublicKey {
        self.0.borrow().public_key
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node({:?})", self.get_address())
    }
}

/// Removes the UTXO consumed by `tx` (if any) and inserts `tx` itself
/// as a new UTXO. Used both for ordinary block acceptance and for
/// rebuilding a UTXO set from scratch during a reorg.
fn fold_block_into_utxo(utxo: &mut IndexMap<TxId, Transaction>, block: &Block) {
    for tx in block.transactions() {
        if let Some(input) = tx.input {
            utxo.shift_remove(&input);
        }
        utxo.insert(tx.txid(), tx.clone());
    }
}

/// Structural validation of a candidate block against a UTXO set
/// (§4.5 step 7): size, at most one coinbase, no duplicate txids, no
/// intra-block double spend, and every non-coinbase input resolves
/// (and verifies) against the UTXO set as of the transactions already
/// folded in earlier in the same block.
fn validate_block(block: &Block, base_utxo: &IndexMap<TxId, Transaction>) -> bool {
    let block_size = NodeLimits::global().block_size;
    if block.transactions().len() > block_size {
        return false;
    }
    if block.transactions().iter().filter(|t| t.is_coinbase()).count() > 1 {
        return false;
    }

    let mut working = base_utxo.clone();
    let mut seen_txids = HashSet::new();
    let mut seen_inputs = HashSet::new();

    for tx in block.transactions() {
        let txid = tx.txid();
        if !seen_txids.insert(txid) {
            return false;
        }
        if let Some(input) = tx.input {
            if !seen_inputs.insert(input) {
                return false;
            }
            let Some(input_utxo) = working.get(&input) else {
                return false;
            };
            if !tx.verify_signature(input_utxo) {
                return false;
            }
            working.shift_remove(&input);
        }
        working.insert(txid, tx.clone());
    }
    true
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod node_tests;
