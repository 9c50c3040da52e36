//! Explain Module - why a bid was flagged
//!
//! Rule-based reasons over the raw bid plus the features that deviate most
//! from the training distribution of the scoring model.

pub mod engine;
pub mod types;

pub use engine::{explain, feature_contributions, rule_reasons};
pub use types::{ExplainResult, FeatureContribution};
