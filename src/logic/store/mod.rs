//! Store Module - Model Persistence
//!
//! - `snapshot.rs` - checksummed snapshot envelope
//! - `storage.rs` - `ModelStore` (save / load / atomic publish)

pub mod snapshot;
pub mod storage;


// Re-export common types
pub use snapshot::{SnapshotFile, FORMAT_VERSION};
pub use storage::ModelStore;
