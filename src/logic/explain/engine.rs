use chrono::Timelike;

use super::types::{ExplainResult, FeatureContribution};
use crate::logic::features::{feature_name, BidRecord, FeatureVector, TenderContext, FEATURE_COUNT};
use crate::logic::model::EnsembleModel;

// Heuristic weights focused on procurement risk
// 1.0 = standard, 1.5 = price manipulation risk, 1.2 = unusual behavior
// This maps to the layout in features/layout.rs
static FEATURE_WEIGHTS: [f64; FEATURE_COUNT] = [
    1.5, // amount_ratio (underbidding / overpricing)
    1.5, // peer_deviation (collusion / outlier pricing)
    1.2, // days_to_deadline (last-minute submission)
    1.2, // hour_sin
    1.2, // hour_cos
    1.0, // weekday_sin
    1.0, // weekday_cos
    1.2, // bidder_recent_bids (bid flooding)
    1.3, // bidder_tender_bids (repeat bids on one tender)
    1.0, // proposal_length_log
    1.0, // proposal_length_z
    1.1, // lexical_diversity (boilerplate / generated text)
];

/// Deviations below this are not worth reporting
const MIN_IMPORTANCE: f64 = 0.5;
const MAX_CONTRIBUTIONS: usize = 5;

const SHORT_PROPOSAL_CHARS: usize = 50;
const LONG_PROPOSAL_CHARS: usize = 5000;
const BUSINESS_DAY_START: u32 = 6;
const BUSINESS_DAY_END: u32 = 22;
/// Margin above the threshold that counts as a strong deviation
const STRONG_MARGIN: f64 = 0.05;

/// Full explanation for a scored bid
pub fn explain(
    model: &EnsembleModel,
    vector: &FeatureVector,
    bid: &BidRecord,
    tender: &TenderContext,
    score: f64,
) -> ExplainResult {
    let mut reasons = rule_reasons(bid, tender);
    if reasons.is_empty() {
        if score - model.threshold() >= STRONG_MARGIN {
            reasons.push("Pattern deviates significantly from normal bidding behavior".to_string());
        } else {
            reasons.push("Mild deviation from typical bid patterns".to_string());
        }
    }

    ExplainResult {
        reasons,
        contributions: feature_contributions(model, vector),
    }
}

/// Plain rules over the raw bid
pub fn rule_reasons(bid: &BidRecord, tender: &TenderContext) -> Vec<String> {
    let mut reasons = Vec::new();

    if bid.amount <= 0.0 {
        reasons.push("Invalid bid amount (zero or negative)".to_string());
    } else if tender.estimated_value > 0.0 {
        let ratio = bid.amount / tender.estimated_value;
        if ratio < 0.5 {
            reasons.push(format!("Bid amount far below the estimate ({:.0}%)", ratio * 100.0));
        } else if ratio > 1.5 {
            reasons.push(format!("Bid amount far above the estimate ({:.0}%)", ratio * 100.0));
        }
    }

    if bid.proposal_length < SHORT_PROPOSAL_CHARS {
        reasons.push("Very short proposal (less than 50 characters)".to_string());
    } else if bid.proposal_length > LONG_PROPOSAL_CHARS {
        reasons.push("Unusually long proposal (over 5000 characters)".to_string());
    }

    if bid.bidder_id.trim().chars().count() < 3 {
        reasons.push("Suspicious bidder identifier (too short)".to_string());
    }

    let hour = bid.submitted_at.hour();
    if hour < BUSINESS_DAY_START || hour > BUSINESS_DAY_END {
        reasons.push("Unusual submission time (outside business hours)".to_string());
    }

    if bid.submitted_at > tender.deadline {
        reasons.push("Submitted after the tender deadline".to_string());
    }

    reasons
}

/// Top features by |z| × weight under the model's normalization
pub fn feature_contributions(model: &EnsembleModel, vector: &FeatureVector) -> Vec<FeatureContribution> {
    let normalized = model.normalization().apply(vector.as_slice());

    let mut contributions: Vec<FeatureContribution> = normalized
        .iter()
        .enumerate()
        .filter_map(|(i, &deviation)| {
            let weight = FEATURE_WEIGHTS.get(i).copied().unwrap_or(1.0);
            let importance = deviation.abs() * weight;
            if importance < MIN_IMPORTANCE {
                return None;
            }

            let name = feature_name(i).unwrap_or("unknown");
            Some(FeatureContribution {
                name: name.to_string(),
                value: vector.get(i).unwrap_or_default(),
                deviation,
                weight,
                importance,
                description: describe(name, deviation),
            })
        })
        .collect();

    contributions.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    contributions.truncate(MAX_CONTRIBUTIONS);
    contributions
}

fn describe(name: &str, deviation: f64) -> Option<String> {
    let higher = deviation > 0.0;
    let text = match name {
        "amount_ratio" if higher => "Bid priced well above the tender estimate",
        "amount_ratio" => "Bid priced well below the tender estimate",
        "peer_deviation" if higher => "Amount far above competing bids",
        "peer_deviation" => "Amount far below competing bids",
        "days_to_deadline" if higher => "Submitted unusually early",
        "days_to_deadline" => "Submitted close to the deadline",
        "hour_sin" | "hour_cos" => "Unusual time of day",
        "weekday_sin" | "weekday_cos" => "Unusual day of week",
        "bidder_recent_bids" if higher => "Bidder submitted many bids recently",
        "bidder_tender_bids" if higher => "Repeated bids on the same tender",
        "proposal_length_log" | "proposal_length_z" if higher => "Proposal much longer than peers",
        "proposal_length_log" | "proposal_length_z" => "Proposal much shorter than peers",
        "lexical_diversity" => "Atypical proposal vocabulary",
        _ => return None,
    };
    Some(text.to_string())
}
