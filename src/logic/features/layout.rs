//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Persisted models record the version and hash they were trained with.
//! A model trained on another layout is rejected, never coerced.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Monetary (0-1) ===
    "amount_ratio",          // 0: bid amount / tender estimated value
    "peer_deviation",        // 1: relative deviation from mean of other bids on the tender

    // === Temporal (2-6) ===
    "days_to_deadline",      // 2: fractional days left before deadline at submission
    "hour_sin",              // 3: cyclic hour of day
    "hour_cos",              // 4
    "weekday_sin",           // 5: cyclic day of week (Monday = 0)
    "weekday_cos",           // 6

    // === Behavioral (7-8) ===
    "bidder_recent_bids",    // 7: bidder submissions across tenders in lookback window
    "bidder_tender_bids",    // 8: bids by the bidder on this tender (incl. this one)

    // === Textual (9-11) ===
    "proposal_length_log",   // 9: ln(1 + proposal length)
    "proposal_length_z",     // 10: z-score against other proposals on the tender
    "lexical_diversity",     // 11: distinct / total words, sentinel when no text
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 12;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
pub fn compute_layout_hash() -> u32 {
    compute_hash_for(FEATURE_VERSION, FEATURE_LAYOUT.iter().copied())
}

/// Hash an arbitrary (version, names) pair the same way the current layout is hashed
pub fn compute_hash_for<'a>(version: u8, names: impl IntoIterator<Item = &'a str>) -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[version]);
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Get layout hash
pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information, stored inside every model snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Self-consistency: names, count and hash agree with each other
    pub fn is_consistent(&self) -> bool {
        self.feature_names.len() == self.feature_count
            && compute_hash_for(self.version, self.feature_names.iter().map(String::as_str))
                == self.hash
    }

    /// Check a vector's (version, hash, len) against this layout
    pub fn check(&self, version: u8, hash: u32, len: usize) -> Result<(), LayoutMismatchError> {
        if version != self.version || hash != self.hash || len != self.feature_count {
            return Err(LayoutMismatchError {
                expected_version: self.version,
                expected_hash: self.hash,
                expected_len: self.feature_count,
                actual_version: version,
                actual_hash: hash,
                actual_len: len,
            });
        }
        Ok(())
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when feature layout doesn't match expected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub expected_len: usize,
    pub actual_version: u8,
    pub actual_hash: u32,
    pub actual_len: usize,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature schema mismatch: expected v{} (hash: {:08x}, {} fields), got v{} (hash: {:08x}, {} fields)",
            self.expected_version,
            self.expected_hash,
            self.expected_len,
            self.actual_version,
            self.actual_hash,
            self.actual_len
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

/// Validate that incoming data matches current layout
pub fn validate_layout(version: u8, hash: u32, len: usize) -> Result<(), LayoutMismatchError> {
    LayoutInfo::current().check(version, hash, len)
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================
