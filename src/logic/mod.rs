//! Logic Module - Scoring & Training Engines
//!
//! - `features/` - Feature extraction (monetary, temporal, behavioral, textual)
//! - `model/` - Isolation ensemble (arena trees, normalization, threshold)
//! - `store/` - Model snapshot persistence and publish
//! - `training/` - Training buffer and coordinator
//! - `explain/` - Reasons for flagged bids
//! - `synthetic` - Synthetic bid corpus generator

pub mod explain;
pub mod features;
pub mod model;
pub mod store;
pub mod synthetic;
pub mod training;
