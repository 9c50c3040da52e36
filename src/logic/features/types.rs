//! Input records handed over by the tender/bid collaborators

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured metadata attached to a finalized bid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BidMetadata {
    /// Earlier bids by the same bidder on the same tender
    pub prior_bids_on_tender: u32,
}

/// A finalized bid. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidRecord {
    pub bid_id: String,
    pub tender_id: String,
    pub bidder_id: String,
    pub amount: f64,
    pub submitted_at: DateTime<Utc>,
    /// Proposal length in characters
    pub proposal_length: usize,
    pub proposal_text: Option<String>,
    #[serde(default)]
    pub metadata: BidMetadata,
}

impl BidRecord {
    pub fn new(
        bid_id: impl Into<String>,
        tender_id: impl Into<String>,
        bidder_id: impl Into<String>,
        amount: f64,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            bid_id: bid_id.into(),
            tender_id: tender_id.into(),
            bidder_id: bidder_id.into(),
            amount,
            submitted_at,
            proposal_length: 0,
            proposal_text: None,
            metadata: BidMetadata::default(),
        }
    }

    /// Attach proposal text (also sets the length)
    pub fn with_proposal(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.proposal_length = text.chars().count();
        self.proposal_text = Some(text);
        self
    }

    pub fn with_prior_bids_on_tender(mut self, count: u32) -> Self {
        self.metadata.prior_bids_on_tender = count;
        self
    }
}

/// Read-only tender reference used during feature derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenderContext {
    pub tender_id: String,
    pub estimated_value: f64,
    pub deadline: DateTime<Utc>,
    pub category: String,
}

/// Historical snapshot supplied with the bid (never includes the bid itself)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BidHistory {
    /// Amounts of the other bids already placed on the same tender
    pub tender_amounts: Vec<f64>,
    /// Proposal lengths of those bids
    pub tender_proposal_lengths: Vec<usize>,
    /// Submission times of the bidder's earlier bids across all tenders
    pub bidder_submissions: Vec<DateTime<Utc>>,
}
