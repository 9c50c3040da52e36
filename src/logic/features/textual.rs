//! Textual Feature Extraction
//!
//! Proposal length (log-scaled and z-scored against peers) and lexical diversity.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::types::{BidHistory, BidRecord};
use super::vector::{FeatureFamily, FeatureVector};

/// Value written when no proposal text is supplied
pub const LEXICAL_DIVERSITY_SENTINEL: f64 = -1.0;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("word pattern is valid"));

#[derive(Debug, Clone, PartialEq)]
pub struct TextualFeatures {
    pub length_log: f64,
    pub length_z: f64,
    pub lexical_diversity: f64,
}

impl TextualFeatures {
    pub fn derive(bid: &BidRecord, history: &BidHistory) -> Self {
        let length = bid.proposal_length as f64;

        Self {
            length_log: length.ln_1p(),
            length_z: length_z_score(length, &history.tender_proposal_lengths),
            lexical_diversity: bid
                .proposal_text
                .as_deref()
                .map(lexical_diversity)
                .unwrap_or(LEXICAL_DIVERSITY_SENTINEL),
        }
    }
}

impl FeatureFamily for TextualFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.set(9, self.length_log);
        vector.set(10, self.length_z);
        vector.set(11, self.lexical_diversity);
    }
}

/// Distinct / total words (case-insensitive). Empty text → 0.
pub fn lexical_diversity(text: &str) -> f64 {
    let words: Vec<String> = WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect();

    if words.is_empty() {
        return 0.0;
    }

    let distinct: HashSet<&str> = words.iter().map(String::as_str).collect();
    distinct.len() as f64 / words.len() as f64
}

fn length_z_score(length: f64, peers: &[usize]) -> f64 {
    if peers.len() < 2 {
        return 0.0;
    }

    let n = peers.len() as f64;
    let mean = peers.iter().map(|&l| l as f64).sum::<f64>() / n;
    let variance = peers.iter().map(|&l| (l as f64 - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    if std < 1e-9 {
        0.0
    } else {
        (length - mean) / std
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_lexical_diversity() {
        assert_eq!(lexical_diversity("alpha beta gamma"), 1.0);
        assert_eq!(lexical_diversity("Cloud cloud CLOUD"), 1.0 / 3.0);
        assert_eq!(lexical_diversity("  ... "), 0.0);
    }

    #[test]
    fn test_sentinel_without_text() {
        let mut bid = BidRecord::new("B", "T", "X", 1.0, Utc::now());
        bid.proposal_length = 120;

        let f = TextualFeatures::derive(&bid, &BidHistory::default());
        assert_eq!(f.lexical_diversity, LEXICAL_DIVERSITY_SENTINEL);
        assert_eq!(f.length_z, 0.0);
        assert!((f.length_log - 121f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_length_z_score() {
        assert_eq!(length_z_score(300.0, &[100, 100, 100]), 0.0);
        assert!((length_z_score(300.0, &[100, 300]) - 1.0).abs() < 1e-12);
    }
}
