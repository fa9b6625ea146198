//! Submission gating against predicted network fees
//!
//! Before every submission the gate predicts the next block's base fee,
//! marks up the network-suggested tip, and only grants clearance when the
//! estimated total stays under the configured ceiling. Deferral is not an
//! error: the gate re-checks after the poll interval until conditions turn
//! favorable (or an optional deadline elapses).

use crate::chain::ChainReader;
use crate::config::SubmissionPolicy;
use crate::error::{SubmitterError, SubmitterResult};
use crate::fee::estimator::predict_next_base_fee;
use crate::metrics;

use ethers::types::U256;
use tokio::time::Instant;
use tracing::debug;

/// Tip markup denominator: the suggested priority fee is raised by 1/20
/// (5%) to stay ahead of other submitters paying the suggested value.
const TIP_MARKUP_DENOMINATOR: u64 = 20;

/// A fee estimate backing one granted clearance.
///
/// Recomputed for every submission attempt, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeEstimate {
    /// Predicted base fee of the next block, in wei per gas
    pub predicted_base_fee: U256,
    /// Marked-up priority tip, in wei per gas
    pub priority_tip: U256,
}

/// Why a clearance check declined to submit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferral {
    /// The latest block carries no base fee; the fee mechanism is not
    /// active, so no prediction is possible
    FeeMechanismInactive,
    /// The estimated total fee exceeds the configured ceiling
    OverCeiling { estimated_total: U256 },
}

/// Outcome of a single clearance evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clearance {
    Granted(FeeEstimate),
    Deferred(Deferral),
}

/// Decides whether current network conditions admit a submission
#[derive(Debug, Clone, Copy)]
pub struct SubmissionGate {
    policy: SubmissionPolicy,
}

impl SubmissionGate {
    pub fn new(policy: SubmissionPolicy) -> Self {
        Self { policy }
    }

    /// Run one clearance evaluation against fresh chain data.
    ///
    /// Never grants clearance when `predicted_base_fee + tip` exceeds the
    /// ceiling.
    pub async fn evaluate(&self, chain: &dyn ChainReader) -> SubmitterResult<Clearance> {
        let height = chain.latest_block_number().await?;
        let snapshot = chain.fee_snapshot(height).await?;

        let predicted_base_fee = predict_next_base_fee(&snapshot);
        if predicted_base_fee.is_zero() {
            return Ok(Clearance::Deferred(Deferral::FeeMechanismInactive));
        }

        let suggested = chain.suggested_priority_fee().await?;
        let priority_tip = suggested + suggested / TIP_MARKUP_DENOMINATOR;

        let estimated_total = predicted_base_fee + priority_tip;
        if estimated_total > self.policy.max_fee_per_gas {
            return Ok(Clearance::Deferred(Deferral::OverCeiling { estimated_total }));
        }

        Ok(Clearance::Granted(FeeEstimate {
            predicted_base_fee,
            priority_tip,
        }))
    }

    /// Wait until the network is cheap enough to submit.
    ///
    /// Re-evaluates after every `poll_interval` for as long as the gate
    /// defers. With no clearance deadline configured this waits
    /// indefinitely; favorable conditions are assumed to arrive eventually.
    pub async fn wait_for_clearance(&self, chain: &dyn ChainReader) -> SubmitterResult<FeeEstimate> {
        let started = Instant::now();

        loop {
            match self.evaluate(chain).await? {
                Clearance::Granted(estimate) => {
                    debug!(
                        predicted_base_fee = %estimate.predicted_base_fee,
                        priority_tip = %estimate.priority_tip,
                        "Fee clearance granted"
                    );
                    return Ok(estimate);
                }
                Clearance::Deferred(deferral) => {
                    match deferral {
                        Deferral::FeeMechanismInactive => {
                            debug!("Latest block has no base fee, deferring submission");
                            metrics::record_gate_deferral("bad_block");
                        }
                        Deferral::OverCeiling { estimated_total } => {
                            debug!(
                                %estimated_total,
                                ceiling = %self.policy.max_fee_per_gas,
                                "Estimated fee over ceiling, deferring submission"
                            );
                            metrics::record_gate_deferral("over_ceiling");
                        }
                    }

                    if let Some(deadline) = self.policy.clearance_deadline {
                        if started.elapsed() >= deadline {
                            return Err(SubmitterError::Timeout {
                                operation: "fee clearance".to_string(),
                            });
                        }
                    }

                    tokio::time::sleep(self.policy.poll_interval).await;
                }
            }
        }
    }
}
