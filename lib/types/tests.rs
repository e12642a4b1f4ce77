use crate::crypto::PrivateKey;
use crate::sha256::GENESIS_BLOCK_PREV;
use crate::types::{Block, Transaction};

#[test]
fn coinbase_has_no_input() {
    let key = PrivateKey::new_key();
    let tx = Transaction::coinbase(key.public_key());
    assert!(tx.is_coinbase());
    assert!(tx.input.is_none());
}

#[test]
fn txid_is_recomputed_not_cached() {
    let key = PrivateKey::new_key();
    let tx = Transaction::coinbase(key.public_key());
    assert_eq!(tx.txid(), tx.txid());
}

#[test]
fn two_coinbases_to_the_same_address_have_different_txids() {
    let key = PrivateKey::new_key();
    let a = Transaction::coinbase(key.public_key());
    let b = Transaction::coinbase(key.public_key());
    assert_ne!(a.txid(), b.txid());
}

#[test]
fn spend_transaction_verifies_against_its_input_utxo() {
    let miner = PrivateKey::new_key();
    let target = PrivateKey::new_key().public_key();
    let coinbase = Transaction::coinbase(miner.public_key());

    let spend = Transaction::spend(&coinbase, target, &miner);

    assert!(spend.verify_signature(&coinbase));
}

#[test]
fn tampering_with_output_invalidates_signature() {
    let miner = PrivateKey::new_key();
    let target = PrivateKey::new_key().public_key();
    let attacker = PrivateKey::new_key().public_key();
    let coinbase = Transaction::coinbase(miner.public_key());

    let mut spend = Transaction::spend(&coinbase, target, &miner);
    spend.output = attacker;

    assert!(!spend.verify_signature(&coinbase));
}

#[test]
fn tampering_with_input_invalidates_signature() {
    let miner = PrivateKey::new_key();
    let target = PrivateKey::new_key().public_key();
    let coinbase_a = Transaction::coinbase(miner.public_key());
    let coinbase_b = Transaction::coinbase(miner.public_key());

    let mut spend = Transaction::spend(&coinbase_a, target, &miner);
    spend.input = Some(coinbase_b.txid());

    assert!(!spend.verify_signature(&coinbase_a));
}

#[test]
fn tampering_with_signature_invalidates_it() {
    let miner = PrivateKey::new_key();
    let target = PrivateKey::new_key().public_key();
    let coinbase = Transaction::coinbase(miner.public_key());

    let mut spend = Transaction::spend(&coinbase, target, &miner);
    spend.signature = crate::crypto::Signature::random_placeholder(64);

    assert!(!spend.verify_signature(&coinbase));
}

#[test]
fn block_hash_depends_on_transaction_order() {
    let miner = PrivateKey::new_key();
    let a = Transaction::coinbase(miner.public_key());
    let b = Transaction::coinbase(miner.public_key());

    let block1 = Block::new(GENESIS_BLOCK_PREV, vec![a.clone(), b.clone()]);
    let block2 = Block::new(GENESIS_BLOCK_PREV, vec![b, a]);

    assert_ne!(block1.block_hash(), block2.block_hash());
}

#[test]
fn block_hash_is_recomputed_not_cached() {
    let miner = PrivateKey::new_key();
    let tx = Transaction::coinbase(miner.public_key());
    let block = Block::new(GENESIS_BLOCK_PREV, vec![tx]);
    assert_eq!(block.block_hash(), block.block_hash());
}

#[test]
fn empty_block_hash_depends_only_on_prev_hash() {
    let block = Block::new(GENESIS_BLOCK_PREV, vec![]);
    assert_eq!(block.prev_block_hash(), GENESIS_BLOCK_PREV);
}

#[test]
fn block_coinbase_lookup_finds_the_mint_transaction() {
    let miner = PrivateKey::new_key();
    let target = PrivateKey::new_key().public_key();
    let coinbase = Transaction::coinbase(miner.public_key());
    let spend = Transaction::spend(&coinbase, target, &miner);
    let block = Block::new(GENESIS_BLOCK_PREV, vec![coinbase.clone(), spend]);

    assert_eq!(block.coinbase(), Some(&coinbase));
}
