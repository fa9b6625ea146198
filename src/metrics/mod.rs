//! Prometheus metrics for the submission core
//!
//! Counters for submission attempts, underpriced retries, and gate
//! deferrals, plus a gas-used histogram. Registered against the default
//! global registry; exposition is the host process's concern.

use ethers::types::TransactionReceipt;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

lazy_static! {
    pub static ref SUBMISSIONS: IntCounter = register_int_counter!(
        "feegate_submissions_total",
        "Total submission attempts issued through the gate"
    )
    .unwrap();

    pub static ref UNDERPRICED_RETRIES: IntCounter = register_int_counter!(
        "feegate_underpriced_retries_total",
        "Total submissions rejected as underpriced and retried"
    )
    .unwrap();

    pub static ref GATE_DEFERRALS: IntCounterVec = register_int_counter_vec!(
        "feegate_gate_deferrals_total",
        "Total clearance checks that deferred, by reason",
        &["reason"]
    )
    .unwrap();

    pub static ref TX_GAS_USED: Histogram = register_histogram!(
        "feegate_tx_gas_used",
        "Gas used by confirmed transactions",
        vec![
            21_000.0, 50_000.0, 100_000.0, 250_000.0, 500_000.0, 1_000_000.0, 2_500_000.0,
            5_000_000.0
        ]
    )
    .unwrap();
}

// Helper functions to record metrics

pub fn record_submission() {
    SUBMISSIONS.inc();
}

pub fn record_underpriced_retry() {
    UNDERPRICED_RETRIES.inc();
}

pub fn record_gate_deferral(reason: &str) {
    GATE_DEFERRALS.with_label_values(&[reason]).inc();
}

pub fn record_gas_used(receipt: &TransactionReceipt) {
    if let Some(gas_used) = receipt.gas_used {
        TX_GAS_USED.observe(gas_used.as_u128() as f64);
    }
}
