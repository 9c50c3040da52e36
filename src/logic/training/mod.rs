//! Training Module - Retrain Lifecycle
//!
//! - `buffer.rs` - rolling window of recent vectors
//! - `coordinator.rs` - triggers, single-flight retrain, scheduler
//! - `status.rs` - observable run state

pub mod buffer;
pub mod coordinator;
pub mod status;

#[cfg(test)]
mod tests;

// Re-export common types
pub use buffer::{BufferStatus, TrainingBuffer};
pub use coordinator::{TrainingConfig, TrainingCoordinator};
pub use status::{RetrainOutcome, RetrainTrigger, TrainingState, TrainingStatus};
