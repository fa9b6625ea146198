//! Retrying, fee-gated submission of transactions and deployments
//!
//! Wraps a caller-supplied, fee-parameterized action: waits for the gate to
//! open, invokes the action, and resubmits with a fresh estimate when the
//! attempt lost the race against a rising base fee. Any other failure is
//! fatal and propagates untouched.

use crate::chain::ChainReader;
use crate::config::SubmissionPolicy;
use crate::error::{FailureKind, SubmitterError, SubmitterResult};
use crate::fee::SubmissionGate;
use crate::metrics;

use ethers::types::{TransactionReceipt, U256};
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// Fee arguments handed to a submission action.
///
/// `max_fee_per_gas` is the configured ceiling, not the estimate: the gate
/// has already proven the estimate fits under it, and offering the full
/// ceiling maximizes inclusion odds without ever overpaying past the
/// configured bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeParams {
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
}

/// Drives fee-parameterized actions to confirmation
pub struct RetryingSubmitter {
    chain: Arc<dyn ChainReader>,
    gate: SubmissionGate,
    policy: SubmissionPolicy,
}

impl RetryingSubmitter {
    pub fn new(chain: Arc<dyn ChainReader>, policy: SubmissionPolicy) -> Self {
        Self {
            chain,
            gate: SubmissionGate::new(policy),
            policy,
        }
    }

    /// Submit a state-mutating transaction and return its confirmed receipt.
    ///
    /// The action must submit with the given fee parameters and await the
    /// receipt itself (e.g. `call.send().await?.await?` with ethers).
    pub async fn submit_transaction<F, Fut>(
        &self,
        action: F,
    ) -> SubmitterResult<TransactionReceipt>
    where
        F: FnMut(FeeParams) -> Fut,
        Fut: Future<Output = SubmitterResult<TransactionReceipt>>,
    {
        let receipt = self.drive(action).await?;

        match receipt.gas_used {
            Some(gas_used) => info!(%gas_used, "Transaction confirmed"),
            None => info!("Transaction confirmed"),
        }
        metrics::record_gas_used(&receipt);

        Ok(receipt)
    }

    /// Submit a contract deployment and return the deployed handle.
    ///
    /// Differs from [`submit_transaction`](Self::submit_transaction) only in
    /// the confirmation primitive the action awaits (`deployed()` rather
    /// than the receipt wait) and in what is returned.
    pub async fn submit_deployment<T, F, Fut>(&self, action: F) -> SubmitterResult<T>
    where
        F: FnMut(FeeParams) -> Fut,
        Fut: Future<Output = SubmitterResult<T>>,
    {
        let handle = self.drive(action).await?;
        info!("Deployment confirmed");
        Ok(handle)
    }

    /// The gate-then-submit loop shared by both entry points.
    ///
    /// Attempts are strictly sequential: a new one starts only once the
    /// previous outcome is known. An underpriced rejection restarts from the
    /// gate check with a freshly computed estimate; every other failure is
    /// terminal.
    async fn drive<T, F, Fut>(&self, mut action: F) -> SubmitterResult<T>
    where
        F: FnMut(FeeParams) -> Fut,
        Fut: Future<Output = SubmitterResult<T>>,
    {
        let mut attempts: u32 = 0;

        loop {
            let estimate = self.gate.wait_for_clearance(self.chain.as_ref()).await?;
            let params = FeeParams {
                max_fee_per_gas: self.policy.max_fee_per_gas,
                max_priority_fee_per_gas: estimate.priority_tip,
            };

            attempts += 1;
            metrics::record_submission();

            match action(params).await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    if !FailureKind::classify(&err).is_retryable() {
                        return Err(err);
                    }

                    if let Some(max_attempts) = self.policy.max_attempts {
                        if attempts >= max_attempts {
                            warn!(attempts, "Underpriced retry budget exhausted");
                            return Err(SubmitterError::RetriesExhausted { attempts });
                        }
                    }

                    warn!(
                        attempts,
                        predicted_base_fee = %estimate.predicted_base_fee,
                        "Submission underpriced against the included block, retrying: {}",
                        err
                    );
                    metrics::record_underpriced_retry();
                }
            }
        }
    }
}
