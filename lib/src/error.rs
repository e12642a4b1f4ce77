//! Error type for the operations that can fail by propagating an `Err`
//! rather than by returning `false`/`None` or silently no-op'ing (mempool
//! admission and reorg are deliberately silent, see `types::node`).

use thiserror::Error;

use crate::sha256::BlockHash;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("a node cannot connect to itself")]
    SelfConnection,

    #[error("block {0} is not known to this node or its peers")]
    UnknownBlock(BlockHash),
}

pub type Result<T> = std::result::Result<T, NodeError>;
