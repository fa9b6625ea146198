//! Fee-gated transaction and deployment submission

pub mod submitter;

pub use submitter::{FeeParams, RetryingSubmitter};
