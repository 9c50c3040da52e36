//! Integration Tests for the Isolation Ensemble

#[cfg(test)]
mod integration_tests {
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::error::ErrorKind;
    use crate::logic::features::{FeatureVector, FEATURE_COUNT, FEATURE_VERSION};
    use crate::logic::model::{EnsembleModel, ForestConfig};

    /// Tight cluster around the origin
    fn cluster(count: usize, seed: u64) -> Vec<FeatureVector> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                let mut values = [0.0; FEATURE_COUNT];
                for v in values.iter_mut() {
                    *v = rng.gen_range(-1.0..1.0);
                }
                FeatureVector::from_values(values)
            })
            .collect()
    }

    fn config() -> ForestConfig {
        ForestConfig::with_seed(42)
    }

    #[test]
    fn test_scores_are_in_unit_interval() {
        let model = EnsembleModel::fit(&cluster(200, 1), &config()).unwrap();

        for v in cluster(100, 2) {
            let score = model.score(&v).unwrap();
            assert!((0.0..=1.0).contains(&score));
        }
        assert!(model.threshold() > 0.0 && model.threshold() < 1.0);
    }

    #[test]
    fn test_same_seed_same_model() {
        let data = cluster(150, 3);
        let a = EnsembleModel::fit(&data, &config()).unwrap();
        let b = EnsembleModel::fit(&data, &config()).unwrap();

        assert_eq!(a.trees(), b.trees());
        assert_eq!(a.threshold().to_bits(), b.threshold().to_bits());
        for v in cluster(20, 4) {
            assert_eq!(a.score(&v).unwrap().to_bits(), b.score(&v).unwrap().to_bits());
        }
    }

    #[test]
    fn test_outlier_scores_above_cluster() {
        let model = EnsembleModel::fit(&cluster(256, 5), &config()).unwrap();

        let normal = cluster(50, 6);
        let mean: f64 = normal.iter().map(|v| model.score(v).unwrap()).sum::<f64>() / normal.len() as f64;

        let outlier = FeatureVector::from_values([25.0; FEATURE_COUNT]);
        let (score, flagged) = model.predict(&outlier).unwrap();
        assert!(score > mean);
        assert!(flagged);
    }

    #[test]
    fn test_flagged_fraction_tracks_contamination() {
        let data = cluster(300, 7);
        let model = EnsembleModel::fit(&data, &config()).unwrap();

        let flagged = data
            .iter()
            .filter(|v| model.predict(v).unwrap().1)
            .count();
        // strict `>` on an interpolated quantile: at most ~10% of training flagged
        assert!(flagged <= 31, "flagged {}", flagged);
        assert!(flagged >= 20, "flagged {}", flagged);
    }

    #[test]
    fn test_schema_mismatch_is_rejected() {
        let model = EnsembleModel::fit(&cluster(64, 8), &config()).unwrap();

        let short = FeatureVector::from_raw(FEATURE_VERSION, model.layout().hash, vec![0.0; FEATURE_COUNT - 1]);
        assert_eq!(model.score(&short).unwrap_err().kind(), ErrorKind::SchemaMismatch);

        let other_hash = FeatureVector::from_raw(
            FEATURE_VERSION,
            model.layout().hash.wrapping_add(1),
            vec![0.0; FEATURE_COUNT],
        );
        assert_eq!(model.score(&other_hash).unwrap_err().kind(), ErrorKind::SchemaMismatch);

        let other_version = FeatureVector::from_raw(
            FEATURE_VERSION.wrapping_add(1),
            model.layout().hash,
            vec![0.0; FEATURE_COUNT],
        );
        assert_eq!(model.score(&other_version).unwrap_err().kind(), ErrorKind::SchemaMismatch);
    }

    #[test]
    fn test_too_few_vectors_aborts() {
        let err = EnsembleModel::fit(&cluster(5, 9), &config()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TrainingAborted);
    }

    #[test]
    fn test_non_finite_training_vector_aborts() {
        let mut data = cluster(40, 10);
        data[3].set(0, f64::NAN);
        let err = EnsembleModel::fit(&data, &config()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TrainingAborted);
    }

    #[test]
    fn test_exhausted_budget_aborts() {
        let data = cluster(200, 11);
        let err = EnsembleModel::fit_with_budget(&data, &config(), Some(Duration::ZERO)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TrainingAborted);
    }

    #[test]
    fn test_fitted_model_passes_self_check() {
        let model = EnsembleModel::fit(&cluster(100, 12), &config()).unwrap();
        assert!(model.self_check().is_ok());
        assert_eq!(model.tree_count(), config().tree_count);
        assert_eq!(model.sample_size(), 100);
        assert_eq!(model.seed(), 42);
        assert_eq!(model.training_stats().count, 100);
    }

    #[test]
    fn test_constant_training_data() {
        let data = vec![FeatureVector::from_values([1.0; FEATURE_COUNT]); 30];
        let model = EnsembleModel::fit(&data, &config()).unwrap();

        let score = model.score(&data[0]).unwrap();
        assert!((0.0..=1.0).contains(&score));
        assert!(!model.is_anomaly(score));
    }
}
