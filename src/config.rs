//! Configuration module

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::features::FeatureConfig;
use crate::logic::model::ForestConfig;
use crate::logic::training::TrainingConfig;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Root directory of the model store
    pub store_dir: PathBuf,

    /// Ensemble construction parameters
    pub forest: ForestConfig,

    /// Retrain triggers, buffer and time budget
    pub training: TrainingConfig,

    /// Feature extraction parameters
    pub features: FeatureConfig,
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let forest = ForestConfig {
            tree_count: constants::get_tree_count(),
            max_samples: constants::get_max_samples(),
            contamination: constants::get_contamination(),
            min_samples: constants::get_min_samples(),
            seed: constants::get_seed(),
        };

        let training = TrainingConfig {
            retrain_threshold: constants::get_retrain_threshold(),
            buffer_capacity: constants::get_buffer_capacity(),
            timeout: Duration::from_secs(constants::get_training_timeout_secs()),
            schedule_interval: Duration::from_secs(constants::get_schedule_interval_secs()),
        };

        let features = FeatureConfig {
            lookback_days: constants::get_lookback_days(),
        };

        Self {
            store_dir: constants::get_store_dir(),
            forest: forest.sanitized(),
            training: training.sanitized(),
            features: features.sanitized(),
        }
    }

    /// Same as the defaults but rooted at `store_dir`
    pub fn with_store_dir(store_dir: impl Into<PathBuf>) -> Self {
        Self {
            store_dir: store_dir.into(),
            ..Self::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_dir: constants::get_store_dir(),
            forest: ForestConfig::default(),
            training: TrainingConfig::default(),
            features: FeatureConfig::default(),
        }
    }
}
