//! Scoring Service - bid → features → published model → score
//!
//! Read-only: every call scores against the model that was current when the
//! call started, and reports that model's version. Never trains.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::status::{EngineStatus, ModelInfo};
use crate::error::Result;
use crate::logic::explain::{self, FeatureContribution};
use crate::logic::features::{BidHistory, BidRecord, FeatureExtractor, FeatureVector, TenderContext};
use crate::logic::model::EnsembleModel;
use crate::logic::store::ModelStore;
use crate::logic::training::TrainingStatus;

/// Result of scoring one bid (persisted by the audit layer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub bid_id: String,
    pub score: f64,
    pub flagged: bool,
    pub model_version: String,
    pub threshold: f64,
    /// Extracted vector, ready to be recorded for training
    pub features: FeatureVector,
    /// Explanation, filled only for flagged bids
    pub reasons: Vec<String>,
    pub contributions: Vec<FeatureContribution>,
}

/// One entry of a batch
#[derive(Debug, Clone, Copy)]
pub struct ScoreRequest<'a> {
    pub bid: &'a BidRecord,
    pub tender: Option<&'a TenderContext>,
    pub history: Option<&'a BidHistory>,
}

pub struct ScoringService {
    extractor: FeatureExtractor,
    store: Arc<ModelStore>,
}

impl ScoringService {
    pub fn new(extractor: FeatureExtractor, store: Arc<ModelStore>) -> Self {
        Self { extractor, store }
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn store(&self) -> &Arc<ModelStore> {
        &self.store
    }

    /// Score one bid against the published model
    pub fn score_bid(
        &self,
        bid: &BidRecord,
        tender: Option<&TenderContext>,
        history: Option<&BidHistory>,
    ) -> Result<ScoreOutcome> {
        let vector = self.extractor.extract(bid, tender, history)?;
        let model = self.store.current()?;
        score_with(&model, bid, tender, vector)
    }

    /// Score a batch against a single model version.
    ///
    /// Fails as a whole only when no model is published; per-bid errors are
    /// returned in place.
    pub fn score_many(&self, requests: &[ScoreRequest<'_>]) -> Result<Vec<Result<ScoreOutcome>>> {
        let model = self.store.current()?;
        log::debug!(
            "Scoring batch of {} bids with model {}",
            requests.len(),
            model.version_id()
        );

        Ok(requests
            .iter()
            .map(|r| {
                let vector = self.extractor.extract(r.bid, r.tender, r.history)?;
                score_with(&model, r.bid, r.tender, vector)
            })
            .collect())
    }

    pub fn model_info(&self) -> Result<ModelInfo> {
        let model = self.store.current()?;
        Ok(ModelInfo::from_model(&model))
    }

    pub fn engine_status(&self, training: TrainingStatus) -> EngineStatus {
        let layout = self.extractor.layout();
        EngineStatus {
            feature_version: layout.version,
            layout_hash: layout.hash,
            feature_count: layout.feature_count,
            model: self.model_info().ok(),
            training,
        }
    }
}

fn score_with(
    model: &EnsembleModel,
    bid: &BidRecord,
    tender: Option<&TenderContext>,
    vector: FeatureVector,
) -> Result<ScoreOutcome> {
    let (score, flagged) = model.predict(&vector)?;

    let (reasons, contributions) = match tender {
        Some(tender) if flagged => {
            let explanation = explain::explain(model, &vector, bid, tender, score);
            (explanation.reasons, explanation.contributions)
        }
        _ => (Vec::new(), Vec::new()),
    };

    if flagged {
        log::info!(
            "Bid {} flagged (score={:.4}, threshold={:.4}, model={}): {}",
            bid.bid_id,
            score,
            model.threshold(),
            model.version_id(),
            reasons.join("; ")
        );
    } else {
        log::debug!("Bid {} scored {:.4} (model={})", bid.bid_id, score, model.version_id());
    }

    Ok(ScoreOutcome {
        bid_id: bid.bid_id.clone(),
        score,
        flagged,
        model_version: model.version_id().to_string(),
        threshold: model.threshold(),
        features: vector,
        reasons,
        contributions,
    })
}
