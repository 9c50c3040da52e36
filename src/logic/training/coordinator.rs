//! Training Coordinator - retrain triggers, single-flight fit → save → publish
//!
//! Scoring never waits on training: a run works on a snapshot of the buffer
//! and the corpus, and only the final publish touches shared state.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use super::buffer::{BufferStatus, TrainingBuffer};
use super::status::{RetrainOutcome, RetrainTrigger, TrainingStatus};
use crate::constants::{
    DEFAULT_BUFFER_CAPACITY, DEFAULT_RETRAIN_THRESHOLD, DEFAULT_SCHEDULE_INTERVAL_SECS,
    DEFAULT_TRAINING_TIMEOUT_SECS,
};
use crate::error::{BidAnomalyError, Result};
use crate::logic::features::{FeatureVector, LayoutInfo};
use crate::logic::model::{EnsembleModel, ForestConfig};
use crate::logic::store::ModelStore;

// ============================================================================
// CONFIG
// ============================================================================

/// Retrain trigger policy and run limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Pending vectors that trigger a retrain
    pub retrain_threshold: usize,
    /// Rolling buffer size (oldest evicted first)
    pub buffer_capacity: usize,
    /// Soft time budget per run
    pub timeout: Duration,
    /// Scheduler tick
    pub schedule_interval: Duration,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            retrain_threshold: DEFAULT_RETRAIN_THRESHOLD,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            timeout: Duration::from_secs(DEFAULT_TRAINING_TIMEOUT_SECS),
            schedule_interval: Duration::from_secs(DEFAULT_SCHEDULE_INTERVAL_SECS),
        }
    }
}

impl TrainingConfig {
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let clean = Self {
            retrain_threshold: self.retrain_threshold.max(1),
            buffer_capacity: self.buffer_capacity.max(1),
            timeout: if self.timeout.is_zero() { defaults.timeout } else { self.timeout },
            schedule_interval: self.schedule_interval.max(Duration::from_secs(1)),
        };
        if clean != self {
            log::warn!("Training config adjusted: {:?} -> {:?}", self, clean);
        }
        clean
    }
}

// ============================================================================
// COORDINATOR
// ============================================================================

pub struct TrainingCoordinator {
    store: Arc<ModelStore>,
    forest: ForestConfig,
    config: TrainingConfig,
    buffer: TrainingBuffer,
    corpus: RwLock<Arc<Vec<FeatureVector>>>,
    pending: AtomicUsize,
    training: AtomicBool,
    status: RwLock<TrainingStatus>,
}

/// Clears the single-flight flag however the run ends
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl TrainingCoordinator {
    pub fn new(store: Arc<ModelStore>, forest: ForestConfig, config: TrainingConfig) -> Self {
        let config = config.sanitized();
        Self {
            store,
            forest: forest.sanitized(),
            buffer: TrainingBuffer::new(config.buffer_capacity),
            config,
            corpus: RwLock::new(Arc::new(Vec::new())),
            pending: AtomicUsize::new(0),
            training: AtomicBool::new(false),
            status: RwLock::new(TrainingStatus::default()),
        }
    }

    pub fn store(&self) -> &Arc<ModelStore> {
        &self.store
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn forest_config(&self) -> &ForestConfig {
        &self.forest
    }

    // ------------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------------

    /// Add the vector of a finalized bid to the rolling buffer
    pub fn record(&self, vector: FeatureVector) -> Result<()> {
        check_vector(&LayoutInfo::current(), &vector)?;

        if self.buffer.push(vector) > 0 {
            log::debug!("Training buffer full, evicted oldest vector");
        }
        self.pending.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Replace the historical corpus trained on alongside the buffer
    pub fn set_corpus(&self, vectors: Vec<FeatureVector>) -> Result<()> {
        let layout = LayoutInfo::current();
        for (i, v) in vectors.iter().enumerate() {
            check_vector(&layout, v).map_err(|e| {
                log::warn!("Training corpus rejected at vector {}: {}", i, e);
                e
            })?;
        }
        log::info!("Training corpus set ({} vectors)", vectors.len());
        *self.corpus.write() = Arc::new(vectors);
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn buffer_status(&self) -> BufferStatus {
        self.buffer.status()
    }

    pub fn should_retrain(&self) -> bool {
        self.pending() >= self.config.retrain_threshold
    }

    pub fn is_training(&self) -> bool {
        self.training.load(Ordering::Acquire)
    }

    // ------------------------------------------------------------------------
    // Retrain
    // ------------------------------------------------------------------------

    /// Run fit → save → publish now.
    ///
    /// Returns `AlreadyTraining` if another run holds the slot. On error the
    /// published model is untouched and the failure is kept in `status()`.
    pub fn retrain(&self, trigger: RetrainTrigger) -> Result<RetrainOutcome> {
        if self
            .training
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("Retrain ({:?}) coalesced into the running one", trigger);
            return Ok(RetrainOutcome::AlreadyTraining);
        }
        let _guard = RunGuard(&self.training);

        // Snapshot: vectors recorded after this point count toward the next run
        let captured = self.pending();
        let corpus = Arc::clone(&self.corpus.read());
        let mut vectors = corpus.to_vec();
        vectors.extend(self.buffer.snapshot());
        let samples = vectors.len();

        self.status.write().start(trigger);
        log::info!("Retrain started ({:?}, {} vectors)", trigger, samples);

        let result = EnsembleModel::fit_with_budget(&vectors, &self.forest, Some(self.config.timeout))
            .and_then(|model| self.store.save_and_publish(&model));

        match result {
            Ok(model) => {
                let _ = self
                    .pending
                    .fetch_update(Ordering::AcqRel, Ordering::Acquire, |p| {
                        Some(p.saturating_sub(captured))
                    });
                self.status.write().succeed(model.version_id());
                log::info!("Retrain succeeded: published {}", model.version_id());
                Ok(RetrainOutcome::Published {
                    version: model.version_id().to_string(),
                    samples,
                })
            }
            Err(e) => {
                self.status.write().abort(e.kind(), e.to_string());
                log::warn!(
                    "Retrain aborted, keeping model {}: {}",
                    self.store.current_version().as_deref().unwrap_or("none"),
                    e
                );
                Err(e)
            }
        }
    }

    /// Retrain only if the count trigger has fired
    pub fn maybe_retrain(&self) -> Result<Option<RetrainOutcome>> {
        if !self.should_retrain() {
            return Ok(None);
        }
        self.retrain(RetrainTrigger::Threshold).map(Some)
    }

    pub fn status(&self) -> TrainingStatus {
        let mut status = self.status.read().clone();
        status.pending = self.pending();
        status.buffered = self.buffer.len();
        status
    }

    // ------------------------------------------------------------------------
    // Scheduler
    // ------------------------------------------------------------------------

    /// Periodically check the count trigger; training runs on the blocking pool
    pub fn spawn_scheduler(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            log::info!("Training scheduler started (every {:?})", interval);

            loop {
                tick.tick().await;
                if !self.should_retrain() || self.is_training() {
                    continue;
                }

                let coordinator = Arc::clone(&self);
                let run = tokio::task::spawn_blocking(move || {
                    coordinator.retrain(RetrainTrigger::Scheduled)
                });

                match run.await {
                    Ok(Ok(outcome)) => log::debug!("Scheduled retrain: {:?}", outcome),
                    // already recorded in status
                    Ok(Err(_)) => {}
                    Err(e) => log::error!("Scheduled retrain task failed: {}", e),
                }
            }
        })
    }
}

/// Only vectors of the current schema with finite values are trainable
fn check_vector(layout: &LayoutInfo, vector: &FeatureVector) -> Result<()> {
    layout.check(vector.version, vector.layout_hash, vector.len())?;
    if !vector.is_finite() {
        return Err(BidAnomalyError::invalid_vector(
            "refusing to train on a vector with non-finite values",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_request_during_run_is_coalesced() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(ModelStore::open(dir.path()).unwrap());
        let coordinator = TrainingCoordinator::new(store, ForestConfig::with_seed(1), TrainingConfig::default());

        coordinator.training.store(true, Ordering::Release);
        let outcome = coordinator.retrain(RetrainTrigger::Manual).unwrap();
        assert_eq!(outcome, RetrainOutcome::AlreadyTraining);
        // the running slot belongs to the other run
        assert!(coordinator.is_training());
        assert_eq!(coordinator.status().runs, 0);
    }

    #[test]
    fn test_config_sanitized() {
        let config = TrainingConfig {
            retrain_threshold: 0,
            buffer_capacity: 0,
            timeout: Duration::ZERO,
            schedule_interval: Duration::from_millis(1),
        }
        .sanitized();

        assert_eq!(config.retrain_threshold, 1);
        assert_eq!(config.buffer_capacity, 1);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TRAINING_TIMEOUT_SECS));
        assert_eq!(config.schedule_interval, Duration::from_secs(1));
    }
}
