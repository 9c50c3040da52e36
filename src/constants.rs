//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Each default can be overridden by an environment variable read through the
//! `get_*` helpers below.

use std::path::PathBuf;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name (also the data directory name)
pub const APP_NAME: &str = "bid-anomaly";

// ============================================
// Ensemble defaults
// ============================================

/// Number of isolation trees per ensemble
pub const DEFAULT_TREE_COUNT: usize = 100;

/// Upper bound of the per-tree subsample size
pub const DEFAULT_MAX_SAMPLES: usize = 256;

/// Expected fraction of anomalies in the training data (10%)
pub const DEFAULT_CONTAMINATION: f64 = 0.1;

// ============================================
// Training defaults
// ============================================

/// Minimum number of vectors required to fit a model
pub const DEFAULT_MIN_SAMPLES: usize = 20;

/// Pending vectors since last retrain that trigger a new run
pub const DEFAULT_RETRAIN_THRESHOLD: usize = 50;

/// Rolling buffer capacity (oldest evicted first)
pub const DEFAULT_BUFFER_CAPACITY: usize = 5_000;

/// Soft time budget for one training run (seconds)
pub const DEFAULT_TRAINING_TIMEOUT_SECS: u64 = 30;

/// How often the scheduler checks the count trigger (seconds)
pub const DEFAULT_SCHEDULE_INTERVAL_SECS: u64 = 60;

// ============================================
// Feature defaults
// ============================================

/// Behavioral lookback window (days)
pub const DEFAULT_LOOKBACK_DAYS: i64 = 90;

/// Longest accepted lookback window (days)
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

// ============================================
// Helper functions to read from env with fallback
// ============================================

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Get model store directory from environment or use the local data dir
pub fn get_store_dir() -> PathBuf {
    std::env::var("BID_ANOMALY_STORE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_NAME)
        })
}

pub fn get_tree_count() -> usize {
    env_parse("BID_ANOMALY_TREES").unwrap_or(DEFAULT_TREE_COUNT)
}

pub fn get_max_samples() -> usize {
    env_parse("BID_ANOMALY_SAMPLE_SIZE").unwrap_or(DEFAULT_MAX_SAMPLES)
}

pub fn get_contamination() -> f64 {
    env_parse("BID_ANOMALY_CONTAMINATION").unwrap_or(DEFAULT_CONTAMINATION)
}

/// Fixed seed for reproducible training (unset = random)
pub fn get_seed() -> Option<u64> {
    env_parse("BID_ANOMALY_SEED")
}

pub fn get_min_samples() -> usize {
    env_parse("BID_ANOMALY_MIN_SAMPLES").unwrap_or(DEFAULT_MIN_SAMPLES)
}

pub fn get_retrain_threshold() -> usize {
    env_parse("BID_ANOMALY_RETRAIN_THRESHOLD").unwrap_or(DEFAULT_RETRAIN_THRESHOLD)
}

pub fn get_buffer_capacity() -> usize {
    env_parse("BID_ANOMALY_BUFFER_CAPACITY").unwrap_or(DEFAULT_BUFFER_CAPACITY)
}

pub fn get_training_timeout_secs() -> u64 {
    env_parse("BID_ANOMALY_TRAINING_TIMEOUT_SECS").unwrap_or(DEFAULT_TRAINING_TIMEOUT_SECS)
}

pub fn get_schedule_interval_secs() -> u64 {
    env_parse("BID_ANOMALY_SCHEDULE_INTERVAL_SECS").unwrap_or(DEFAULT_SCHEDULE_INTERVAL_SECS)
}

pub fn get_lookback_days() -> i64 {
    env_parse("BID_ANOMALY_LOOKBACK_DAYS").unwrap_or(DEFAULT_LOOKBACK_DAYS)
}
