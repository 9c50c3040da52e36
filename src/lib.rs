//! Bid Anomaly Core - Library Entry Point
//!
//! Anomaly scoring engine for tender bids.
//!
//! ## Architecture
//! - `logic/features/` - Bid + tender context → versioned feature vector
//! - `logic/model/` - Isolation ensemble (fit, score, threshold)
//! - `logic/store/` - Versioned snapshots + atomic "current" pointer
//! - `logic/training/` - Rolling buffer, retrain triggers, scheduler
//! - `logic/explain/` - Human-readable reasons for flagged bids
//! - `logic/synthetic.rs` - Seeded generator of typical / suspicious bids
//! - `api/` - `ScoringService` facade used by collaborators

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod logic;

pub use api::{EngineStatus, ModelInfo, ScoreOutcome, ScoreRequest, ScoringService};
pub use config::EngineConfig;
pub use error::{BidAnomalyError, ErrorKind, Result};
pub use logic::features::{
    BidHistory, BidMetadata, BidRecord, FeatureExtractor, FeatureVector, TenderContext,
};
pub use logic::model::{EnsembleModel, ForestConfig};
pub use logic::store::ModelStore;
pub use logic::training::{
    RetrainOutcome, RetrainTrigger, TrainingConfig, TrainingCoordinator, TrainingState, TrainingStatus,
};
