//! Chain access module
//!
//! Provides the read-only chain capabilities the submission core consumes:
//! block heights, per-block fee snapshots, and suggested priority fees,
//! backed by multi-RPC providers with automatic failover.

pub mod provider;

pub use provider::{BlockFeeSnapshot, ChainProvider, ChainReader};

#[cfg(test)]
pub use provider::MockChainReader;
