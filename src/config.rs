//! Configuration for the feegate submission core
//!
//! Loads settings from TOML files with environment variable substitution.
//! The derived [`SubmissionPolicy`] is fixed for the process lifetime and
//! read-only thereafter.

use anyhow::{Context, Result};
use ethers::types::U256;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub submitter: SubmitterConfig,
    pub chains: HashMap<String, ChainConfig>,
}

/// Submission throttle configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitterConfig {
    /// Hard ceiling on the total per-gas fee, in gwei. No transaction is
    /// ever offered above this.
    pub max_fee_per_gas_gwei: u64,
    /// Delay between clearance re-checks while the network is too expensive
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Bound on underpriced resubmissions. `None` retries indefinitely,
    /// which is the right default for a supervised deployment run.
    #[serde(default)]
    pub max_attempts: Option<u32>,
    /// Bound on how long to wait for fee clearance. `None` waits
    /// indefinitely.
    #[serde(default)]
    pub clearance_deadline_secs: Option<u64>,
}

fn default_poll_interval_secs() -> u64 {
    15
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: String,
    pub rpc_urls: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Process-wide submission policy, derived from [`SubmitterConfig`]
#[derive(Debug, Clone, Copy)]
pub struct SubmissionPolicy {
    /// Hard per-gas fee ceiling, in wei
    pub max_fee_per_gas: U256,
    /// Delay between clearance re-checks
    pub poll_interval: Duration,
    /// Bound on underpriced resubmissions, `None` = unbounded
    pub max_attempts: Option<u32>,
    /// Bound on waiting for clearance, `None` = unbounded
    pub clearance_deadline: Option<Duration>,
}

const WEI_PER_GWEI: u64 = 1_000_000_000;

impl SubmitterConfig {
    /// Derive the runtime submission policy
    pub fn policy(&self) -> SubmissionPolicy {
        SubmissionPolicy {
            max_fee_per_gas: U256::from(self.max_fee_per_gas_gwei) * U256::from(WEI_PER_GWEI),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            max_attempts: self.max_attempts,
            clearance_deadline: self.clearance_deadline_secs.map(Duration::from_secs),
        }
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = env::var("FEEGATE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"));

        Self::load_from(&config_path)
    }

    /// Load settings from a specific path
    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        // Substitute environment variables
        let config_str = substitute_env_vars(&config_str);

        let settings: Settings =
            toml::from_str(&config_str).with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.submitter.max_fee_per_gas_gwei == 0 {
            anyhow::bail!("max_fee_per_gas_gwei must be nonzero");
        }
        if self.submitter.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be nonzero");
        }
        if let Some(0) = self.submitter.max_attempts {
            anyhow::bail!("max_attempts must be nonzero when set");
        }

        // At least one chain must be enabled
        if self.enabled_chains().is_empty() {
            anyhow::bail!("At least one chain must be enabled");
        }

        for (name, chain) in &self.chains {
            if chain.enabled && chain.rpc_urls.is_empty() {
                anyhow::bail!("Chain {} has no RPC URLs configured", name);
            }
        }

        Ok(())
    }

    /// Get list of enabled chains
    pub fn enabled_chains(&self) -> Vec<(&String, &ChainConfig)> {
        self.chains.iter().filter(|(_, c)| c.enabled).collect()
    }

    /// Get chain config by chain ID
    pub fn get_chain_by_id(&self, chain_id: u64) -> Option<&ChainConfig> {
        self.chains.values().find(|c| c.chain_id == chain_id)
    }
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    let mut result = input.to_string();
    let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        let var_value = env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}
