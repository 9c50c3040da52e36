//! Contamination Threshold
//!
//! The flagging cutoff is the score at the (1 - contamination) quantile of
//! the training scores, computed once at fit time and stored with the model.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CONTAMINATION;

/// Largest accepted contamination rate
pub const MAX_CONTAMINATION: f64 = 0.5;

/// Clamp a configured contamination rate into (0, 0.5]
pub fn sanitize_contamination(rate: f64) -> f64 {
    if rate.is_finite() && rate > 0.0 {
        rate.min(MAX_CONTAMINATION)
    } else {
        DEFAULT_CONTAMINATION
    }
}

/// Linear-interpolated quantile of unsorted scores (`q` in [0, 1])
pub fn quantile(scores: &[f64], q: f64) -> f64 {
    if scores.is_empty() {
        return 1.0;
    }

    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Cutoff implied by the contamination rate
pub fn contamination_threshold(training_scores: &[f64], contamination: f64) -> f64 {
    quantile(training_scores, 1.0 - sanitize_contamination(contamination))
}

/// Summary of the scores observed during training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl ScoreStats {
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self { count: 0, mean: 0.0, min: 0.0, max: 0.0 };
        }

        Self {
            count: scores.len(),
            mean: scores.iter().sum::<f64>() / scores.len() as f64,
            min: scores.iter().copied().fold(f64::INFINITY, f64::min),
            max: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_interpolates() {
        let scores = [0.4, 0.1, 0.3, 0.2, 0.5];
        assert_eq!(quantile(&scores, 0.0), 0.1);
        assert_eq!(quantile(&scores, 1.0), 0.5);
        assert!((quantile(&scores, 0.9) - 0.46).abs() < 1e-12);
    }

    #[test]
    fn test_contamination_threshold() {
        let scores: Vec<f64> = (0..=100).map(|i| i as f64 / 100.0).collect();
        assert!((contamination_threshold(&scores, 0.1) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_sanitize_contamination() {
        assert_eq!(sanitize_contamination(0.1), 0.1);
        assert_eq!(sanitize_contamination(0.9), MAX_CONTAMINATION);
        assert_eq!(sanitize_contamination(0.0), DEFAULT_CONTAMINATION);
        assert_eq!(sanitize_contamination(f64::NAN), DEFAULT_CONTAMINATION);
    }

    #[test]
    fn test_score_stats() {
        let stats = ScoreStats::from_scores(&[0.2, 0.4, 0.6]);
        assert_eq!(stats.count, 3);
        assert!((stats.mean - 0.4).abs() < 1e-12);
        assert_eq!(stats.min, 0.2);
        assert_eq!(stats.max, 0.6);
    }
}
