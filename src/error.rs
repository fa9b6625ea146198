//! Error types for the feegate submission core

use ethers::providers::ProviderError;
use thiserror::Error;

/// Main error type for the submission core
#[derive(Error, Debug)]
pub enum SubmitterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Chain connection error: {0}")]
    ChainConnection(String),

    #[error("Fee estimation error: {0}")]
    FeeEstimation(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Timeout waiting for {operation}")]
    Timeout { operation: String },

    #[error("Gave up after {attempts} underpriced attempts")]
    RetriesExhausted { attempts: u32 },
}

impl SubmitterError {
    /// Wrap an error from a transaction submission, preserving the
    /// underlying chain error text for classification.
    pub fn transaction(err: impl std::fmt::Display) -> Self {
        SubmitterError::Transaction(err.to_string())
    }

    /// Wrap an error from a contract call or deployment.
    pub fn contract(err: impl std::fmt::Display) -> Self {
        SubmitterError::Contract(err.to_string())
    }
}

impl From<ProviderError> for SubmitterError {
    fn from(err: ProviderError) -> Self {
        SubmitterError::ChainConnection(err.to_string())
    }
}

/// Classified failure kind for a submission attempt.
///
/// Only `Underpriced` is eligible for resubmission; everything else is
/// terminal for the invocation that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The offered fee was below the block's actual base fee at inclusion
    /// time. A race between prediction and block production, not a logic
    /// error.
    Underpriced,
    /// Execution reverted on-chain.
    Reverted,
    /// Connectivity or timeout failure talking to the chain.
    NetworkError,
    /// Anything else (bad nonce, insufficient funds, ...).
    Other,
}

impl FailureKind {
    /// Classify a submission failure.
    pub fn classify(err: &SubmitterError) -> Self {
        match err {
            SubmitterError::ChainConnection(_) | SubmitterError::Timeout { .. } => {
                FailureKind::NetworkError
            }
            SubmitterError::Transaction(msg) | SubmitterError::Contract(msg) => {
                classify_text(msg)
            }
            _ => FailureKind::Other,
        }
    }

    /// Whether the submitter may retry this failure with a fresh estimate.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::Underpriced)
    }
}

/// Last-resort textual classification of a chain client's error message.
///
/// Execution clients report fee and revert failures with client-specific
/// JSON-RPC text rather than stable codes, so this is the single place the
/// known phrasings are matched. Keep every pattern lowercase.
fn classify_text(msg: &str) -> FailureKind {
    let msg = msg.to_ascii_lowercase();

    // geth: "transaction underpriced" / "replacement transaction underpriced"
    // geth/erigon: "max fee per gas less than block base fee"
    // besu/nethermind: "fee cap less than block base fee"
    if msg.contains("underpriced")
        || msg.contains("max fee per gas less than block base fee")
        || msg.contains("fee cap less than block base fee")
    {
        FailureKind::Underpriced
    } else if msg.contains("revert") {
        FailureKind::Reverted
    } else {
        FailureKind::Other
    }
}

/// Result type for submission core operations
pub type SubmitterResult<T> = Result<T, SubmitterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underpriced_phrasings_classify_as_underpriced() {
        for msg in [
            "transaction underpriced",
            "replacement transaction underpriced",
            "err: max fee per gas less than block base fee: address 0xabc, maxFeePerGas: 104, baseFee: 110",
            "Fee cap less than block base fee",
        ] {
            let err = SubmitterError::transaction(msg);
            assert_eq!(FailureKind::classify(&err), FailureKind::Underpriced, "{msg}");
            assert!(FailureKind::classify(&err).is_retryable());
        }
    }

    #[test]
    fn reverts_classify_as_reverted() {
        let err = SubmitterError::contract("execution reverted: Ownable: caller is not the owner");
        assert_eq!(FailureKind::classify(&err), FailureKind::Reverted);
        assert!(!FailureKind::classify(&err).is_retryable());
    }

    #[test]
    fn connection_failures_classify_as_network() {
        let err = SubmitterError::ChainConnection("connection refused".to_string());
        assert_eq!(FailureKind::classify(&err), FailureKind::NetworkError);

        let err = SubmitterError::Timeout {
            operation: "send transaction".to_string(),
        };
        assert_eq!(FailureKind::classify(&err), FailureKind::NetworkError);
    }

    #[test]
    fn unknown_failures_classify_as_other() {
        for msg in ["nonce too low", "insufficient funds for gas * price + value"] {
            let err = SubmitterError::transaction(msg);
            assert_eq!(FailureKind::classify(&err), FailureKind::Other, "{msg}");
            assert!(!FailureKind::classify(&err).is_retryable());
        }
    }
}
