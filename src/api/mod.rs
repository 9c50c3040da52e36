//! API Module
//!
//! Structure:
//! - service.rs: `ScoringService`, the façade collaborators call
//! - status.rs: serializable model / engine status types

pub mod service;
pub mod status;


pub use service::{ScoreOutcome, ScoreRequest, ScoringService};
pub use status::{EngineStatus, ModelInfo};
