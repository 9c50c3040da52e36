use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub name: String,
    pub value: f64,
    /// Signed deviation from the training mean, in training standard deviations
    pub deviation: f64,
    pub weight: f64,
    pub importance: f64, // |deviation| * weight
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplainResult {
    /// Human-readable reasons, most specific first
    pub reasons: Vec<String>,
    /// Top deviating features, by importance
    pub contributions: Vec<FeatureContribution>,
}

impl ExplainResult {
    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty() && self.contributions.is_empty()
    }
}
