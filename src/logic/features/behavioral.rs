//! Behavioral Feature Extraction
//!
//! Bidder activity counts. A bidder placing more than one bid on the same
//! tender is recorded as a feature value, not rejected.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::types::{BidHistory, BidRecord};
use super::vector::{FeatureFamily, FeatureVector};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehavioralFeatures {
    /// Bids by the bidder across all tenders inside the lookback window
    pub recent_bids: u32,
    /// Bids by the bidder on this tender, including this one
    pub tender_bids: u32,
}

impl BehavioralFeatures {
    pub fn derive(bid: &BidRecord, history: &BidHistory, lookback_days: i64) -> Self {
        // a window reaching past the representable range counts everything
        let window_start = Duration::try_days(lookback_days.max(0))
            .and_then(|window| bid.submitted_at.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let recent_bids = history
            .bidder_submissions
            .iter()
            .filter(|&&at| at >= window_start && at < bid.submitted_at)
            .count() as u32;

        Self {
            recent_bids,
            tender_bids: bid.metadata.prior_bids_on_tender.saturating_add(1),
        }
    }
}

impl FeatureFamily for BehavioralFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.set(7, self.recent_bids as f64); // bidder_recent_bids
        vector.set(8, self.tender_bids as f64); // bidder_tender_bids
    }
}
