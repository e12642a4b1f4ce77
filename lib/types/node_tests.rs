use super::*;

#[test]
fn fresh_node_has_genesis_tip_and_zero_balance() {
    let node = Node::new();
    assert_eq!(node.get_latest_hash(), GENESIS_BLOCK_PREV);
    assert_eq!(node.get_balance(), 0);
    assert!(node.get_utxo().is_empty());
    assert!(node.get_mempool().is_empty());
}

#[test]
fn connecting_a_node_to_itself_is_rejected() {
    let node = Node::new();
    let err = node.connect(&node).unwrap_err();
    assert!(matches!(err, NodeError::SelfConnection));
}

#[test]
fn connect_is_symmetric_and_idempotent() {
    let a = Node::new();
    let b = Node::new();
    a.connect(&b).unwrap();
    assert_eq!(a.get_connections().len(), 1);
    assert_eq!(b.get_connections().len(), 1);

    a.connect(&b).unwrap();
    assert_eq!(a.get_connections().len(), 1);
    assert_eq!(b.get_connections().len(), 1);
}

#[test]
fn disconnect_is_silent_when_not_connected() {
    let a = Node::new();
    let b = Node::new();
    a.disconnect_from(&b);
    assert!(a.get_connections().is_empty());
}

#[test]
fn mining_mints_a_coin_to_the_miner() {
    let node = Node::new();
    let hash = node.mine_block();
    assert_eq!(hash, node.get_latest_hash());
    assert_ne!(hash, GENESIS_BLOCK_PREV);
    assert_eq!(node.get_balance(), 1);

    let block = node.get_block(hash).unwrap();
    assert_eq!(block.transactions().len(), 1);
    assert!(block.transactions()[0].is_coinbase());
}

#[test]
fn get_block_errors_on_unknown_hash() {
    let node = Node::new();
    let other = Node::new();
    other.mine_block();
    let unknown_hash = other.get_latest_hash();

    let err = node.get_block(unknown_hash).unwrap_err();
    assert!(matches!(err, NodeError::UnknownBlock(h) if h == unknown_hash));
}

#[test]
fn create_transaction_moves_a_coin() {
    let alice = Node::new();
    let bob = Node::new();
    alice.mine_block();

    let tx = alice.create_transaction(bob.get_address()).unwrap();
    assert_eq!(tx.output, bob.get_address());
    assert!(alice.get_mempool().iter().any(|t| t.txid() == tx.txid()));
}

#[test]
fn double_spend_without_clearing_mempool_fails() {
    let alice = Node::new();
    let bob = Node::new();
    let carol = Node::new();
    alice.mine_block();

    assert!(alice.create_transaction(bob.get_address()).is_some());
    assert!(alice.create_transaction(carol.get_address()).is_none());

    alice.clear_mempool();
    assert!(alice.create_transaction(carol.get_address()).is_some());
}

#[test]
fn malicious_peer_serving_wrong_block_leaves_chain_unchanged() {
    let victim = Node::new();
    let real = Transaction::coinbase(PrivateKey::new_key().public_key());
    let real_block = Block::new(GENESIS_BLOCK_PREV, vec![real]);
    let real_hash = real_block.block_hash();

    // attacker's chain contains a different block than the one whose
    // hash it claims to be notifying about.
    let swapped = Transaction::coinbase(PrivateKey::new_key().public_key());
    let attacker = Node::from_chain(vec![Block::new(GENESIS_BLOCK_PREV, vec![swapped])]);

    victim.notify_of_block(real_hash, &attacker);
    assert_eq!(victim.get_latest_hash(), GENESIS_BLOCK_PREV);
}

#[test]
fn oversized_block_is_rejected_during_reorg() {
    let victim = Node::new();
    let miner = PrivateKey::new_key().public_key();

    let block_size = NodeLimits::global().block_size;
    let txs: Vec<Transaction> = (0..=block_size).map(|_| Transaction::coinbase(miner)).collect();
    let oversized = Block::new(GENESIS_BLOCK_PREV, txs);
    let hash = oversized.block_hash();
    let attacker = Node::from_chain(vec![oversized]);

    victim.notify_of_block(hash, &attacker);
    assert_eq!(victim.get_latest_hash(), GENESIS_BLOCK_PREV);
}

#[test]
fn two_coinbases_in_one_block_are_rejected() {
    let victim = Node::new();
    let miner = PrivateKey::new_key().public_key();

    let txs = vec![Transaction::coinbase(miner), Transaction::coinbase(miner)];
    let block = Block::new(GENESIS_BLOCK_PREV, txs);
    let hash = block.block_hash();
    let attacker = Node::from_chain(vec![block]);

    victim.notify_of_block(hash, &attacker);
    assert_eq!(victim.get_latest_hash(), GENESIS_BLOCK_PREV);
}

#[test]
fn chain_that_never_reaches_genesis_is_bounded_by_max_reorg_depth() {
    let victim = Node::new();
    let miner = PrivateKey::new_key().public_key();
    let max_depth = NodeLimits::global().max_reorg_depth;

    // a chain rooted at an arbitrary hash instead of GENESIS_BLOCK_PREV,
    // long enough that walking it backward never meets genesis or the
    // victim's (empty) local chain within the bound.
    let mut prev = crate::sha256::Hash::hash_bytes(b"not genesis");
    let mut chain = Vec::with_capacity(max_depth + 1);
    for _ in 0..=max_depth {
        let block = Block::new(prev, vec![Transaction::coinbase(miner)]);
        prev = block.block_hash();
        chain.push(block);
    }
    let tip_hash = chain.last().unwrap().block_hash();
    let attacker = Node::from_chain(chain);

    victim.notify_of_block(tip_hash, &attacker);
    assert_eq!(victim.get_latest_hash(), GENESIS_BLOCK_PREV);
}
