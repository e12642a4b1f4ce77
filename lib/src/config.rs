//! Configuration for the limits that govern block construction and chain
//! reorgs.
//!
//! Configuration priority (highest to lowest):
//! 1. Environment variables
//! 2. Hardcoded defaults

use std::sync::OnceLock;

use crate::{BLOCK_SIZE, MAX_REORG_DEPTH};

static CONFIG: OnceLock<NodeLimits> = OnceLock::new();

/// Limits shared by every [`crate::types::Node`] in a process.
#[derive(Debug, Clone, Copy)]
pub struct NodeLimits {
    /// Maximum transactions in a mined block, coinbase included.
    pub block_size: usize,

    /// How many blocks `notify_of_block` will walk backward from a peer
    /// looking for a common ancestor before giving up.
    pub max_reorg_depth: usize,
}

impl Default for NodeLimits {
    fn default() -> Self {
        Self {
            block_size: BLOCK_SIZE,
            max_reorg_depth: MAX_REORG_DEPTH,
        }
    }
}

impl NodeLimits {
    /// Loads limits from `NODE_BLOCK_SIZE` / `NODE_MAX_REORG_DEPTH`,
    /// falling back to the compiled defaults for anything unset or
    /// unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            block_size: parse_env("NODE_BLOCK_SIZE").unwrap_or(defaults.block_size),
            max_reorg_depth: parse_env("NODE_MAX_REORG_DEPTH").unwrap_or(defaults.max_reorg_depth),
        }
    }

    /// Returns the process-wide limits, loading them from the
    /// environment on first access.
    pub fn global() -> &'static NodeLimits {
        CONFIG.get_or_init(NodeLimits::from_env)
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_var(key)?.parse().ok()
}
