//! Monetary Feature Extraction
//!
//! So sánh giá thầu với giá dự toán và với các giá thầu khác của cùng gói thầu.

use super::types::{BidHistory, BidRecord, TenderContext};
use super::vector::{FeatureFamily, FeatureVector};
use crate::error::{BidAnomalyError, Result};

/// Peer means below this are treated as "no usable peers"
const MIN_PEER_MEAN: f64 = 1e-9;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonetaryFeatures {
    pub amount_ratio: f64,
    pub peer_deviation: f64,
    pub peer_count: usize,
}

impl MonetaryFeatures {
    pub fn derive(bid: &BidRecord, tender: &TenderContext, history: &BidHistory) -> Result<Self> {
        if !bid.amount.is_finite() {
            return Err(BidAnomalyError::insufficient(format!(
                "bid {} has a non-finite amount",
                bid.bid_id
            )));
        }
        if !tender.estimated_value.is_finite() || tender.estimated_value <= 0.0 {
            return Err(BidAnomalyError::insufficient(format!(
                "tender {} has no usable estimated value ({})",
                tender.tender_id, tender.estimated_value
            )));
        }

        let peers: Vec<f64> = history
            .tender_amounts
            .iter()
            .copied()
            .filter(|a| a.is_finite())
            .collect();

        let peer_deviation = if peers.is_empty() {
            0.0
        } else {
            let mean = peers.iter().sum::<f64>() / peers.len() as f64;
            if mean.abs() < MIN_PEER_MEAN {
                0.0
            } else {
                (bid.amount - mean) / mean
            }
        };

        Ok(Self {
            amount_ratio: bid.amount / tender.estimated_value,
            peer_deviation,
            peer_count: peers.len(),
        })
    }
}

impl FeatureFamily for MonetaryFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.set(0, self.amount_ratio);   // amount_ratio
        vector.set(1, self.peer_deviation); // peer_deviation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tender(value: f64) -> TenderContext {
        TenderContext {
            tender_id: "T-1".into(),
            estimated_value: value,
            deadline: Utc.with_ymd_and_hms(2026, 3, 1, 17, 0, 0).unwrap(),
            category: "IT".into(),
        }
    }

    fn bid(amount: f64) -> BidRecord {
        BidRecord::new("B-1", "T-1", "ACME", amount, Utc.with_ymd_and_hms(2026, 2, 20, 10, 0, 0).unwrap())
    }

    #[test]
    fn test_amount_ratio_and_peer_deviation() {
        let history = BidHistory {
            tender_amounts: vec![90_000.0, 110_000.0],
            ..Default::default()
        };
        let f = MonetaryFeatures::derive(&bid(150_000.0), &tender(100_000.0), &history).unwrap();

        assert!((f.amount_ratio - 1.5).abs() < 1e-12);
        assert!((f.peer_deviation - 0.5).abs() < 1e-12);
        assert_eq!(f.peer_count, 2);
    }

    #[test]
    fn test_first_bid_on_tender_has_zero_deviation() {
        let f = MonetaryFeatures::derive(&bid(80_000.0), &tender(100_000.0), &BidHistory::default()).unwrap();
        assert_eq!(f.peer_deviation, 0.0);
        assert_eq!(f.peer_count, 0);
    }

    #[test]
    fn test_zero_estimate_is_insufficient() {
        let err = MonetaryFeatures::derive(&bid(1.0), &tender(0.0), &BidHistory::default()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InsufficientContext);
    }
}
