//! Model Module - Isolation Ensemble
//!
//! - `tree.rs` - arena-based isolation tree + path length normalizer c(n)
//! - `forest.rs` - `EnsembleModel` fit / score / self-check
//! - `normalize.rs` - per-feature mean/scale
//! - `threshold.rs` - contamination cutoff

pub mod forest;
pub mod normalize;
pub mod threshold;
pub mod tree;

#[cfg(test)]
mod tests;

// Re-export common types
pub use forest::{EnsembleModel, ForestConfig};
pub use normalize::NormalizationParams;
pub use threshold::ScoreStats;
pub use tree::{IsolationTree, Node};
