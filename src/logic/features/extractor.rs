//! Feature Extractor - bid + tender context → FeatureVector
//!
//! Pure and deterministic: no I/O, no clock, no randomness. Missing context
//! is an error, never a silent default.

use serde::{Deserialize, Serialize};

use super::behavioral::BehavioralFeatures;
use super::layout::{LayoutInfo, FEATURE_VERSION};
use super::monetary::MonetaryFeatures;
use super::temporal::TemporalFeatures;
use super::textual::TextualFeatures;
use super::types::{BidHistory, BidRecord, TenderContext};
use super::vector::{FeatureFamily, FeatureVector};
use crate::constants::{DEFAULT_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS};
use crate::error::{BidAnomalyError, Result};

/// Feature extraction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Behavioral lookback window (days)
    pub lookback_days: i64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl FeatureConfig {
    pub fn sanitized(self) -> Self {
        let clean = Self {
            lookback_days: self.lookback_days.clamp(0, MAX_LOOKBACK_DAYS),
        };
        if clean != self {
            log::warn!("Feature config adjusted: {:?} -> {:?}", self, clean);
        }
        clean
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Schema of every vector this extractor produces
    pub fn layout(&self) -> LayoutInfo {
        LayoutInfo::current()
    }

    pub fn schema_version(&self) -> u8 {
        FEATURE_VERSION
    }

    /// Extract the feature vector of one bid
    ///
    /// `tender` and `history` are optional at the call site because collaborators
    /// may not have them; both are required to derive the vector.
    pub fn extract(
        &self,
        bid: &BidRecord,
        tender: Option<&TenderContext>,
        history: Option<&BidHistory>,
    ) -> Result<FeatureVector> {
        let tender = tender.ok_or_else(|| {
            BidAnomalyError::insufficient(format!("no tender context for bid {}", bid.bid_id))
        })?;
        let history = history.ok_or_else(|| {
            BidAnomalyError::insufficient(format!("no historical snapshot for bid {}", bid.bid_id))
        })?;

        if tender.tender_id != bid.tender_id {
            return Err(BidAnomalyError::insufficient(format!(
                "tender context {} does not belong to bid {} (tender {})",
                tender.tender_id, bid.bid_id, bid.tender_id
            )));
        }

        let monetary = MonetaryFeatures::derive(bid, tender, history)?;
        let temporal = TemporalFeatures::derive(bid, tender);
        let behavioral = BehavioralFeatures::derive(bid, history, self.config.lookback_days);
        let textual = TextualFeatures::derive(bid, history);

        let families: [&dyn FeatureFamily; 4] = [&monetary, &temporal, &behavioral, &textual];

        let mut vector = FeatureVector::new();
        for family in families {
            family.extract(&mut vector);
        }

        if !vector.is_finite() {
            return Err(BidAnomalyError::insufficient(format!(
                "bid {} produced non-finite features",
                bid.bid_id
            )));
        }

        log::debug!("Extracted features for bid {}: {:?}", bid.bid_id, vector.values);
        Ok(vector)
    }
}
