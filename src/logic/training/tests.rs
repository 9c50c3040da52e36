//! Integration Tests for the Training Lifecycle

#[cfg(test)]
mod integration_tests {
    use std::sync::{Arc, Barrier};
    use std::time::Duration;

    use tempfile::TempDir;

    use crate::error::ErrorKind;
    use crate::logic::features::{FeatureExtractor, FeatureVector, FEATURE_COUNT};
    use crate::logic::model::ForestConfig;
    use crate::logic::store::ModelStore;
    use crate::logic::synthetic::SyntheticBidGenerator;
    use crate::logic::training::{
        RetrainOutcome, RetrainTrigger, TrainingConfig, TrainingCoordinator, TrainingState,
    };

    fn forest() -> ForestConfig {
        ForestConfig {
            tree_count: 20,
            ..ForestConfig::with_seed(7)
        }
    }

    fn training(threshold: usize) -> TrainingConfig {
        TrainingConfig {
            retrain_threshold: threshold,
            ..TrainingConfig::default()
        }
    }

    fn typical(count: usize, seed: u64) -> Vec<FeatureVector> {
        SyntheticBidGenerator::new(seed)
            .typical_vectors(&FeatureExtractor::default(), count)
            .unwrap()
    }

    fn coordinator(dir: &TempDir, threshold: usize) -> TrainingCoordinator {
        let store = Arc::new(ModelStore::open(dir.path()).unwrap());
        TrainingCoordinator::new(store, forest(), training(threshold))
    }

    #[test]
    fn test_manual_retrain_publishes() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(&dir, 50);
        coordinator.set_corpus(typical(60, 1)).unwrap();

        let outcome = coordinator.retrain(RetrainTrigger::Manual).unwrap();
        let RetrainOutcome::Published { version, samples } = outcome else {
            panic!("expected a published model");
        };

        assert_eq!(samples, 60);
        assert_eq!(coordinator.store().current_version(), Some(version.clone()));

        let status = coordinator.status();
        assert_eq!(status.state, TrainingState::Succeeded);
        assert_eq!(status.last_version, Some(version));
        assert_eq!(status.last_trigger, Some(RetrainTrigger::Manual));
    }

    #[test]
    fn test_too_few_vectors_keeps_current_model() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(&dir, 50);
        coordinator.set_corpus(typical(40, 2)).unwrap();
        coordinator.retrain(RetrainTrigger::Manual).unwrap();
        let published = coordinator.store().current().unwrap();

        coordinator.set_corpus(Vec::new()).unwrap();
        for v in typical(5, 3) {
            coordinator.record(v).unwrap();
        }

        let err = coordinator.retrain(RetrainTrigger::Manual).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TrainingAborted);

        let current = coordinator.store().current().unwrap();
        assert!(Arc::ptr_eq(&published, &current));

        let status = coordinator.status();
        assert_eq!(status.state, TrainingState::Aborted);
        assert_eq!(status.last_error_kind, Some(ErrorKind::TrainingAborted));
        assert_eq!(status.failures, 1);
        // failed run does not consume pending vectors
        assert_eq!(status.pending, 5);
    }

    #[test]
    fn test_threshold_trigger_resets_pending() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(&dir, 30);

        let vectors = typical(45, 4);
        for v in vectors.iter().take(29).cloned() {
            coordinator.record(v).unwrap();
        }
        assert!(!coordinator.should_retrain());
        assert_eq!(coordinator.maybe_retrain().unwrap(), None);

        for v in vectors.into_iter().skip(29) {
            coordinator.record(v).unwrap();
        }
        assert!(coordinator.should_retrain());

        let outcome = coordinator.maybe_retrain().unwrap();
        assert!(matches!(outcome, Some(RetrainOutcome::Published { samples: 45, .. })));
        assert_eq!(coordinator.pending(), 0);
        assert!(!coordinator.should_retrain());
        assert_eq!(coordinator.status().last_trigger, Some(RetrainTrigger::Threshold));
    }

    #[test]
    fn test_record_rejects_foreign_schema() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(&dir, 30);

        let foreign = FeatureVector::from_raw(99, 0, vec![0.0; FEATURE_COUNT]);
        assert_eq!(coordinator.record(foreign).unwrap_err().kind(), ErrorKind::SchemaMismatch);
        assert_eq!(coordinator.pending(), 0);
    }

    #[test]
    fn test_record_rejects_non_finite_vector() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(&dir, 30);

        let mut values = [0.5; FEATURE_COUNT];
        values[3] = f64::INFINITY;
        let err = coordinator.record(FeatureVector::from_values(values)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidVector);
        assert_eq!(coordinator.pending(), 0);
        assert_eq!(coordinator.status().buffered, 0);
    }

    #[test]
    fn test_corpus_with_nan_is_refused_and_previous_kept() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(&dir, 50);
        coordinator.set_corpus(typical(40, 9)).unwrap();

        let mut poisoned = typical(40, 10);
        poisoned[17].set(0, f64::NAN);
        let err = coordinator.set_corpus(poisoned).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidVector);

        // the clean corpus is still the one trained on
        let outcome = coordinator.retrain(RetrainTrigger::Manual).unwrap();
        assert!(matches!(outcome, RetrainOutcome::Published { samples: 40, .. }));
    }

    #[test]
    fn test_concurrent_requests_coalesce() {
        let dir = TempDir::new().unwrap();
        let coordinator = Arc::new(coordinator(&dir, 50));
        coordinator.set_corpus(typical(200, 5)).unwrap();

        let barrier = Arc::new(Barrier::new(4));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let coordinator = Arc::clone(&coordinator);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    coordinator.retrain(RetrainTrigger::Manual)
                })
            })
            .collect();

        let outcomes: Vec<RetrainOutcome> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();

        let published = outcomes
            .iter()
            .filter(|o| matches!(o, RetrainOutcome::Published { .. }))
            .count();
        assert!(published >= 1);
        assert!(!coordinator.is_training());
        assert_eq!(coordinator.status().runs as usize, published);
    }

    #[test]
    fn test_buffer_is_bounded() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(ModelStore::open(dir.path()).unwrap());
        let config = TrainingConfig {
            buffer_capacity: 25,
            ..training(1000)
        };
        let coordinator = TrainingCoordinator::new(store, forest(), config);

        for v in typical(40, 6) {
            coordinator.record(v).unwrap();
        }

        let status = coordinator.status();
        assert_eq!(status.buffered, 25);
        assert_eq!(status.pending, 40);

        let outcome = coordinator.retrain(RetrainTrigger::Manual).unwrap();
        assert!(matches!(outcome, RetrainOutcome::Published { samples: 25, .. }));
    }

    #[tokio::test]
    async fn test_scheduler_retrains_when_threshold_reached() {
        let dir = TempDir::new().unwrap();
        let coordinator = Arc::new(coordinator(&dir, 20));
        for v in typical(30, 8) {
            coordinator.record(v).unwrap();
        }

        let handle = Arc::clone(&coordinator).spawn_scheduler(Duration::from_millis(20));

        let mut published = false;
        for _ in 0..500 {
            if coordinator.status().state == TrainingState::Succeeded {
                published = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        handle.abort();

        assert!(published, "scheduler never published a model");
        assert_eq!(coordinator.status().last_trigger, Some(RetrainTrigger::Scheduled));
        assert_eq!(coordinator.pending(), 0);
    }
}
