//! Chain access with multi-RPC support and automatic failover

use crate::config::ChainConfig;
use crate::error::{SubmitterError, SubmitterResult};

use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{Block, BlockNumber, H256, U256};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, error, warn};

/// One mined block's fee-relevant fields.
///
/// Fetched fresh for every clearance decision and discarded afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockFeeSnapshot {
    pub gas_limit: U256,
    pub gas_used: U256,
    /// Absent on chains (or forks) where the base-fee mechanism is inactive
    pub base_fee_per_gas: Option<U256>,
}

impl From<&Block<H256>> for BlockFeeSnapshot {
    fn from(block: &Block<H256>) -> Self {
        Self {
            gas_limit: block.gas_limit,
            gas_used: block.gas_used,
            base_fee_per_gas: block.base_fee_per_gas,
        }
    }
}

/// Read-only chain capabilities the submission core consumes.
///
/// The gate and submitter depend on this seam rather than a concrete
/// provider so the polling and retry logic can be exercised against a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Height of the latest confirmed block
    async fn latest_block_number(&self) -> SubmitterResult<u64>;

    /// Fee-relevant fields of the block at `number`
    async fn fee_snapshot(&self, number: u64) -> SubmitterResult<BlockFeeSnapshot>;

    /// The network-suggested priority tip, per gas unit in wei
    async fn suggested_priority_fee(&self) -> SubmitterResult<U256>;
}

/// Multi-provider chain reader with automatic failover
pub struct ChainProvider {
    /// Chain configuration
    config: ChainConfig,
    /// HTTP providers (multiple for failover)
    http_providers: Vec<Provider<Http>>,
    /// Current active provider index
    current_provider: AtomicUsize,
}

impl ChainProvider {
    /// Create a new chain provider
    pub fn new(config: ChainConfig) -> SubmitterResult<Self> {
        let mut http_providers = Vec::new();

        for url in &config.rpc_urls {
            match Provider::<Http>::try_from(url.as_str()) {
                Ok(provider) => {
                    let provider = provider.interval(Duration::from_millis(100));
                    http_providers.push(provider);
                    debug!("Added HTTP provider for chain {}: {}", config.chain_id, url);
                }
                Err(e) => {
                    warn!("Failed to create provider for {}: {}", url, e);
                }
            }
        }

        if http_providers.is_empty() {
            return Err(SubmitterError::ChainConnection(format!(
                "No valid RPC providers for chain {}",
                config.chain_id
            )));
        }

        Ok(Self {
            config,
            http_providers,
            current_provider: AtomicUsize::new(0),
        })
    }

    /// Get the active HTTP provider
    pub fn http(&self) -> &Provider<Http> {
        let idx = self.current_provider.load(Ordering::Relaxed);
        &self.http_providers[idx % self.http_providers.len()]
    }

    /// Switch to the next available provider
    pub fn failover(&self) {
        let current = self.current_provider.load(Ordering::Relaxed);
        let next = (current + 1) % self.http_providers.len();
        self.current_provider.store(next, Ordering::Relaxed);
        warn!(
            "Chain {} failover to provider {}",
            self.config.chain_id, next
        );
    }

    /// Health check
    pub async fn health_check(&self) -> bool {
        match self.latest_block_number().await {
            Ok(_) => true,
            Err(e) => {
                error!(
                    "Health check failed for chain {}: {}",
                    self.config.chain_id, e
                );
                false
            }
        }
    }

    /// Get chain ID
    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }
}

#[async_trait]
impl ChainReader for ChainProvider {
    async fn latest_block_number(&self) -> SubmitterResult<u64> {
        for _ in 0..self.http_providers.len() {
            match self.http().get_block_number().await {
                Ok(block) => return Ok(block.as_u64()),
                Err(e) => {
                    warn!(
                        "Failed to get block number from chain {}: {}",
                        self.config.chain_id, e
                    );
                    self.failover();
                }
            }
        }

        Err(SubmitterError::ChainConnection(format!(
            "All providers failed for chain {}",
            self.config.chain_id
        )))
    }

    async fn fee_snapshot(&self, number: u64) -> SubmitterResult<BlockFeeSnapshot> {
        for _ in 0..self.http_providers.len() {
            match self.http().get_block(BlockNumber::Number(number.into())).await {
                Ok(Some(block)) => return Ok(BlockFeeSnapshot::from(&block)),
                Ok(None) => {
                    return Err(SubmitterError::FeeEstimation(format!(
                        "Block {} not found on chain {}",
                        number, self.config.chain_id
                    )));
                }
                Err(e) => {
                    warn!(
                        "Failed to get block {} from chain {}: {}",
                        number, self.config.chain_id, e
                    );
                    self.failover();
                }
            }
        }

        Err(SubmitterError::ChainConnection(format!(
            "All providers failed for chain {}",
            self.config.chain_id
        )))
    }

    async fn suggested_priority_fee(&self) -> SubmitterResult<U256> {
        for _ in 0..self.http_providers.len() {
            match self.http().estimate_eip1559_fees(None).await {
                Ok((_, priority_fee)) => return Ok(priority_fee),
                Err(e) => {
                    warn!(
                        "Failed to estimate fees on chain {}: {}",
                        self.config.chain_id, e
                    );
                    self.failover();
                }
            }
        }

        Err(SubmitterError::ChainConnection(format!(
            "All providers failed for chain {}",
            self.config.chain_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_config(rpc_urls: Vec<String>) -> ChainConfig {
        ChainConfig {
            chain_id: 11155111,
            name: "sepolia".to_string(),
            rpc_urls,
            enabled: true,
        }
    }

    #[test]
    fn rejects_empty_provider_list() {
        let result = ChainProvider::new(chain_config(vec![]));
        assert!(matches!(result, Err(SubmitterError::ChainConnection(_))));
    }

    #[test]
    fn failover_rotates_through_providers() {
        let provider = ChainProvider::new(chain_config(vec![
            "http://localhost:8545".to_string(),
            "http://localhost:8546".to_string(),
        ]))
        .unwrap();

        assert_eq!(provider.current_provider.load(Ordering::Relaxed), 0);
        provider.failover();
        assert_eq!(provider.current_provider.load(Ordering::Relaxed), 1);
        provider.failover();
        assert_eq!(provider.current_provider.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn snapshot_copies_fee_fields_from_block() {
        let block = Block::<H256> {
            gas_limit: U256::from(30_000_000u64),
            gas_used: U256::from(12_000_000u64),
            base_fee_per_gas: Some(U256::from(7_000_000_000u64)),
            ..Default::default()
        };

        let snapshot = BlockFeeSnapshot::from(&block);
        assert_eq!(snapshot.gas_limit, U256::from(30_000_000u64));
        assert_eq!(snapshot.gas_used, U256::from(12_000_000u64));
        assert_eq!(snapshot.base_fee_per_gas, Some(U256::from(7_000_000_000u64)));
    }
}
