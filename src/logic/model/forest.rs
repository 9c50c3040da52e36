//! Isolation Ensemble - fit & score
//!
//! An `EnsembleModel` is immutable once `fit` returns. Retraining always
//! produces a new model object; the store swaps the published pointer.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::normalize::NormalizationParams;
use super::threshold::{contamination_threshold, sanitize_contamination, ScoreStats};
use super::tree::{average_path_length, depth_ceiling, IsolationTree};
use crate::constants::{
    DEFAULT_CONTAMINATION, DEFAULT_MAX_SAMPLES, DEFAULT_MIN_SAMPLES, DEFAULT_TREE_COUNT,
};
use crate::error::{BidAnomalyError, Result};
use crate::logic::features::{FeatureVector, LayoutInfo};

// ============================================================================
// CONFIG
// ============================================================================

/// Ensemble construction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees (T)
    pub tree_count: usize,
    /// Per-tree subsample is min(max_samples, N)
    pub max_samples: usize,
    /// Expected fraction of anomalies, drives the flagging threshold
    pub contamination: f64,
    /// Below this many vectors `fit` refuses to train
    pub min_samples: usize,
    /// Fixed seed for reproducible builds (None = fresh entropy)
    pub seed: Option<u64>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            tree_count: DEFAULT_TREE_COUNT,
            max_samples: DEFAULT_MAX_SAMPLES,
            contamination: DEFAULT_CONTAMINATION,
            min_samples: DEFAULT_MIN_SAMPLES,
            seed: None,
        }
    }
}

impl ForestConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Clamp out-of-range values instead of failing at startup
    pub fn sanitized(self) -> Self {
        let clean = Self {
            tree_count: self.tree_count.max(1),
            max_samples: self.max_samples.max(2),
            contamination: sanitize_contamination(self.contamination),
            min_samples: self.min_samples.max(2),
            seed: self.seed,
        };
        if clean != self {
            log::warn!("Forest config adjusted: {:?} -> {:?}", self, clean);
        }
        clean
    }
}

// ============================================================================
// MODEL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleModel {
    version_id: String,
    layout: LayoutInfo,
    normalization: NormalizationParams,
    contamination: f64,
    threshold: f64,
    sample_size: usize,
    seed: u64,
    trained_at: DateTime<Utc>,
    training_stats: ScoreStats,
    trees: Vec<IsolationTree>,
}

impl EnsembleModel {
    /// Fit a new ensemble (no time budget)
    pub fn fit(vectors: &[FeatureVector], config: &ForestConfig) -> Result<Self> {
        Self::fit_with_budget(vectors, config, None)
    }

    /// Fit a new ensemble, abandoning the build once `budget` is spent.
    ///
    /// The budget is checked between trees; a tree that has started is finished.
    pub fn fit_with_budget(
        vectors: &[FeatureVector],
        config: &ForestConfig,
        budget: Option<Duration>,
    ) -> Result<Self> {
        let config = config.clone().sanitized();
        let started = Instant::now();
        let layout = LayoutInfo::current();

        if vectors.len() < config.min_samples {
            return Err(BidAnomalyError::aborted(format!(
                "need at least {} vectors, got {}",
                config.min_samples,
                vectors.len()
            )));
        }

        for (i, v) in vectors.iter().enumerate() {
            layout
                .check(v.version, v.layout_hash, v.len())
                .map_err(|e| BidAnomalyError::aborted(format!("training vector {}: {}", i, e)))?;
            if !v.is_finite() {
                return Err(BidAnomalyError::aborted(format!(
                    "training vector {} has non-finite values",
                    i
                )));
            }
        }

        // 1. Normalization
        let rows: Vec<&[f64]> = vectors.iter().map(FeatureVector::as_slice).collect();
        let normalization = NormalizationParams::fit(&rows);
        let data: Vec<Vec<f64>> = rows.iter().map(|r| normalization.apply(r)).collect();

        // 2. Trees
        let n = data.len();
        let sample_size = config.max_samples.min(n);
        let ceiling = depth_ceiling(sample_size);
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut trees = Vec::with_capacity(config.tree_count);
        for t in 0..config.tree_count {
            if let Some(budget) = budget {
                if started.elapsed() > budget {
                    return Err(BidAnomalyError::aborted(format!(
                        "time budget {:?} exceeded after {} of {} trees",
                        budget, t, config.tree_count
                    )));
                }
            }

            let sample = rand::seq::index::sample(&mut rng, n, sample_size).into_vec();
            trees.push(IsolationTree::build(&data, sample, ceiling, &mut rng));
        }

        let mut model = Self {
            version_id: new_version_id(),
            layout,
            normalization,
            contamination: config.contamination,
            threshold: 1.0,
            sample_size,
            seed,
            trained_at: Utc::now(),
            training_stats: ScoreStats::from_scores(&[]),
            trees,
        };

        // 3. Threshold from the training distribution
        let training_scores: Vec<f64> = data.iter().map(|x| model.score_normalized(x)).collect();
        model.threshold = contamination_threshold(&training_scores, model.contamination);
        model.training_stats = ScoreStats::from_scores(&training_scores);

        log::info!(
            "Fitted ensemble {} ({} trees, ψ={}, N={}, threshold={:.4}) in {:?}",
            model.version_id,
            model.trees.len(),
            sample_size,
            n,
            model.threshold,
            started.elapsed()
        );

        Ok(model)
    }

    // ------------------------------------------------------------------------
    // Scoring
    // ------------------------------------------------------------------------

    /// Anomaly score in [0, 1]; rejects vectors of another schema
    pub fn score(&self, vector: &FeatureVector) -> Result<f64> {
        self.layout
            .check(vector.version, vector.layout_hash, vector.len())?;

        let x = self.normalization.apply(vector.as_slice());
        Ok(self.score_normalized(&x))
    }

    /// Score and flag in one call
    pub fn predict(&self, vector: &FeatureVector) -> Result<(f64, bool)> {
        let score = self.score(vector)?;
        Ok((score, self.is_anomaly(score)))
    }

    pub fn is_anomaly(&self, score: f64) -> bool {
        score > self.threshold
    }

    /// Mean path length across trees for an already-normalized row
    pub fn average_path(&self, x: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.path_length(x)).sum();
        total / self.trees.len() as f64
    }

    fn score_normalized(&self, x: &[f64]) -> f64 {
        let c = average_path_length(self.sample_size);
        if c <= 0.0 || self.trees.is_empty() {
            return 0.5;
        }

        2f64.powf(-self.average_path(x) / c).clamp(0.0, 1.0)
    }

    // ------------------------------------------------------------------------
    // Self-check (snapshots)
    // ------------------------------------------------------------------------

    /// Structural consistency check run on every loaded snapshot
    pub fn self_check(&self) -> std::result::Result<(), String> {
        if !self.layout.is_consistent() {
            return Err("layout hash does not match its feature names".into());
        }
        if !self.normalization.is_valid(self.layout.feature_count) {
            return Err("normalization parameters do not match the layout".into());
        }
        if !(self.contamination > 0.0 && self.contamination <= super::threshold::MAX_CONTAMINATION) {
            return Err(format!("contamination {} out of range", self.contamination));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(format!("threshold {} out of range", self.threshold));
        }
        if self.sample_size < 2 {
            return Err(format!("sample size {} too small", self.sample_size));
        }
        if self.trees.is_empty() {
            return Err("ensemble has no trees".into());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.layout.feature_count)
                .map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn version_id(&self) -> &str {
        &self.version_id
    }

    pub fn layout(&self) -> &LayoutInfo {
        &self.layout
    }

    pub fn normalization(&self) -> &NormalizationParams {
        &self.normalization
    }

    pub fn contamination(&self) -> f64 {
        self.contamination
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn training_stats(&self) -> &ScoreStats {
        &self.training_stats
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[IsolationTree] {
        &self.trees
    }
}

/// Sortable version id: UTC timestamp + random suffix
fn new_version_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().format("%Y%m%dT%H%M%S%3fZ"), &suffix[..8])
}
