//! Fee prediction and submission gating

pub mod estimator;
pub mod gate;

pub use estimator::predict_next_base_fee;
pub use gate::{Clearance, Deferral, FeeEstimate, SubmissionGate};
