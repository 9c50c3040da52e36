//! Normalization parameters từ training
//!
//! Per-feature standardization (mean / population std). Features with no
//! spread keep a scale of 1 so they pass through centered.

use serde::{Deserialize, Serialize};

/// Scales below this are treated as zero spread
const MIN_SCALE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

impl NormalizationParams {
    /// Identity transform for `dims` features
    pub fn identity(dims: usize) -> Self {
        Self {
            means: vec![0.0; dims],
            scales: vec![1.0; dims],
        }
    }

    /// Fit mean/scale over rows of equal length
    pub fn fit(rows: &[&[f64]]) -> Self {
        let dims = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.is_empty() {
            return Self::identity(dims);
        }

        let n = rows.len() as f64;
        let mut means = vec![0.0; dims];
        for row in rows {
            for (m, v) in means.iter_mut().zip(row.iter()) {
                *m += v;
            }
        }
        for m in means.iter_mut() {
            *m /= n;
        }

        let mut scales = vec![0.0; dims];
        for row in rows {
            for ((s, v), m) in scales.iter_mut().zip(row.iter()).zip(means.iter()) {
                *s += (v - m).powi(2);
            }
        }
        for s in scales.iter_mut() {
            let std = (*s / n).sqrt();
            *s = if std < MIN_SCALE { 1.0 } else { std };
        }

        Self { means, scales }
    }

    pub fn dims(&self) -> usize {
        self.means.len()
    }

    /// Normalize one row. Caller guarantees `values.len() == self.dims()`.
    pub fn apply(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .zip(self.means.iter().zip(self.scales.iter()))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }

    /// Lengths agree, every value finite, every scale positive
    pub fn is_valid(&self, dims: usize) -> bool {
        self.means.len() == dims
            && self.scales.len() == dims
            && self.means.iter().all(|m| m.is_finite())
            && self.scales.iter().all(|s| s.is_finite() && *s > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_and_apply() {
        let a = [1.0, 10.0];
        let b = [3.0, 10.0];
        let params = NormalizationParams::fit(&[&a, &b]);

        assert_eq!(params.means, vec![2.0, 10.0]);
        assert_eq!(params.scales, vec![1.0, 1.0]); // std of [1,3] is 1; constant column keeps 1
        assert_eq!(params.apply(&[3.0, 12.0]), vec![1.0, 2.0]);
        assert!(params.is_valid(2));
    }

    #[test]
    fn test_invalid_params() {
        let mut params = NormalizationParams::identity(3);
        assert!(params.is_valid(3));
        assert!(!params.is_valid(4));

        params.scales[1] = 0.0;
        assert!(!params.is_valid(3));
    }
}
