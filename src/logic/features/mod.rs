//! Features Module - Feature Extraction Engine
//!
//! Tách logic trích xuất features khỏi scoring.
//! Each family (monetary, temporal, behavioral, textual) owns its slots in
//! the layout defined by `layout.rs`.

pub mod behavioral;
pub mod extractor;
pub mod layout;
pub mod monetary;
pub mod temporal;
pub mod textual;
pub mod types;
pub mod vector;


// Re-export common types
pub use extractor::{FeatureConfig, FeatureExtractor};
pub use layout::{
    feature_index, feature_name, layout_hash, LayoutInfo, LayoutMismatchError, FEATURE_COUNT,
    FEATURE_LAYOUT, FEATURE_VERSION,
};
pub use types::{BidHistory, BidMetadata, BidRecord, TenderContext};
pub use vector::{FeatureFamily, FeatureVector};
