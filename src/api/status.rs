use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::model::{EnsembleModel, ScoreStats};
use crate::logic::training::TrainingStatus;

/// Description of the published model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub version_id: String,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub features: Vec<String>,
    pub tree_count: usize,
    pub sample_size: usize,
    pub contamination: f64,
    pub threshold: f64,
    pub seed: u64,
    pub trained_at: DateTime<Utc>,
    pub training_scores: ScoreStats,
}

impl ModelInfo {
    pub fn from_model(model: &EnsembleModel) -> Self {
        let layout = model.layout();
        Self {
            model_type: "isolation_forest".to_string(),
            version_id: model.version_id().to_string(),
            feature_version: layout.version,
            layout_hash: layout.hash,
            features: layout.feature_names.clone(),
            tree_count: model.tree_count(),
            sample_size: model.sample_size(),
            contamination: model.contamination(),
            threshold: model.threshold(),
            seed: model.seed(),
            trained_at: model.trained_at(),
            training_scores: model.training_stats().clone(),
        }
    }
}

/// Combined engine status (model + training lifecycle)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub feature_version: u8,
    pub layout_hash: u32,
    pub feature_count: usize,

    pub model: Option<ModelInfo>,
    pub training: TrainingStatus,
}
