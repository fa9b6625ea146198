//! Feegate - fee-aware transaction submission for EVM deployment tooling
//!
//! Deployment runs against public networks want their transactions mined
//! without paying whatever the network happens to ask at the moment the
//! script reaches them. This crate predicts the next block's base fee from
//! the EIP-1559 adjustment rules, holds every submission until the
//! predicted total stays under a configured ceiling, and resubmits attempts
//! that lose the race against a rising base fee.
//!
//! The caller supplies the action (an ethers contract call or deployment
//! parameterized by fee arguments); the core supplies the throttling:
//!
//! ```no_run
//! use std::sync::Arc;
//! use feegate::{ChainProvider, RetryingSubmitter, Settings, SubmitterError};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let settings = Settings::load()?;
//! let (_, chain_config) = settings.enabled_chains()[0];
//! let chain = Arc::new(ChainProvider::new(chain_config.clone())?);
//! let submitter = RetryingSubmitter::new(chain, settings.submitter.policy());
//!
//! let receipt = submitter
//!     .submit_transaction(|fees| async move {
//!         // build, send, and await the call with `fees`, e.g. with ethers:
//!         //   contract.method::<_, ()>("register", addr)?
//!         //       .gas_price(...) // apply fees.max_fee_per_gas / tip
//!         //       .send().await?.await?
//!         # let _ = fees;
//!         Err::<ethers::types::TransactionReceipt, _>(SubmitterError::transaction("..."))
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod config;
pub mod error;
pub mod fee;
pub mod metrics;
pub mod tx;

pub use chain::{BlockFeeSnapshot, ChainProvider, ChainReader};
pub use config::{ChainConfig, Settings, SubmissionPolicy, SubmitterConfig};
pub use error::{FailureKind, SubmitterError, SubmitterResult};
pub use fee::{predict_next_base_fee, Clearance, Deferral, FeeEstimate, SubmissionGate};
pub use tx::{FeeParams, RetryingSubmitter};
