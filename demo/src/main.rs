use anyhow::Result;
use coinnet::Node;
use tracing::info;

#[derive(argh::FromArgs)]
/// Run a small in-process coinnet simulation: spin up a handful of nodes,
/// connect them, mine a few rounds and print balances.
struct Args {
    #[argh(option, default = "3")]
    /// number of nodes in the simulated network
    nodes: usize,

    #[argh(option, default = "2")]
    /// number of mining rounds to run, one block per node per round
    rounds: usize,
}

fn init_tracing() {
    tracing_subscriber::fmt::init();
}

fn main() -> Result<()> {
    init_tracing();
    let args: Args = argh::from_env();

    let nodes: Vec<Node> = (0..args.nodes.max(1)).map(|_| Node::new()).collect();
    info!(count = nodes.len(), "spun up nodes");

    // fully connect the mesh so every node converges on the same chain.
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            nodes[i].connect(&nodes[j])?;
        }
    }

    for round in 0..args.rounds {
        for (i, node) in nodes.iter().enumerate() {
            let hash = node.mine_block();
            info!(round, node = i, %hash, "mined block");
        }
    }

    if nodes.len() > 1 {
        let tx = nodes[0]
            .create_transaction(nodes[1].get_address())
            .expect("miner has at least one spendable coin after mining");
        info!(txid = %tx.txid(), "created transaction");
        nodes[0].mine_block();
    }

    for (i, node) in nodes.iter().enumerate() {
        println!(
            "node {i}: balance={} latest_hash={} mempool={}",
            node.get_balance(),
            node.get_latest_hash(),
            node.get_mempool().len()
        );
    }

    Ok(())
}
