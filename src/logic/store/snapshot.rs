//! Model Snapshot - on-disk envelope with checksum
//!
//! A snapshot file holds the serialized model as a string payload plus a
//! SHA-256 checksum of that payload, so tampering or truncation is detected
//! before the model is ever deserialized.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{BidAnomalyError, Result};
use crate::logic::features::LayoutInfo;
use crate::logic::model::EnsembleModel;

/// Snapshot file format version
pub const FORMAT_VERSION: u32 = 1;

/// Stored snapshot file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    /// File format version
    pub format_version: u32,

    /// Version id of the model inside
    pub version_id: String,

    /// SHA-256 (hex) of `payload`
    pub checksum: String,

    /// Serialized `EnsembleModel`
    pub payload: String,
}

/// Hex SHA-256 of a payload
pub fn checksum(payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hex::encode(hasher.finalize())
}

/// Serialize a model into snapshot bytes
pub fn encode(model: &EnsembleModel) -> Result<Vec<u8>> {
    let payload = serde_json::to_string(model)?;
    let file = SnapshotFile {
        format_version: FORMAT_VERSION,
        version_id: model.version_id().to_string(),
        checksum: checksum(payload.as_bytes()),
        payload,
    };
    Ok(serde_json::to_vec_pretty(&file)?)
}

/// Deserialize and verify snapshot bytes.
///
/// Any failure (envelope, checksum, payload, self-check) is `CorruptModel`.
pub fn decode(expected_version: &str, bytes: &[u8]) -> Result<EnsembleModel> {
    let corrupt = |reason: String| BidAnomalyError::corrupt(expected_version, reason);

    let file: SnapshotFile =
        serde_json::from_slice(bytes).map_err(|e| corrupt(format!("unreadable envelope: {}", e)))?;

    if file.format_version != FORMAT_VERSION {
        return Err(corrupt(format!(
            "unsupported format version {}",
            file.format_version
        )));
    }
    if file.version_id != expected_version {
        return Err(corrupt(format!("envelope names version {}", file.version_id)));
    }
    if checksum(file.payload.as_bytes()) != file.checksum {
        return Err(corrupt("checksum mismatch".to_string()));
    }

    let model: EnsembleModel = serde_json::from_str(&file.payload)
        .map_err(|e| corrupt(format!("unreadable payload: {}", e)))?;

    if model.version_id() != expected_version {
        return Err(corrupt(format!("payload names version {}", model.version_id())));
    }
    model.self_check().map_err(corrupt)?;

    Ok(model)
}

/// A loaded model is only publishable under the running feature schema
pub fn check_compatible(model: &EnsembleModel) -> Result<()> {
    let current = LayoutInfo::current();
    let layout = model.layout();
    current.check(layout.version, layout.hash, layout.feature_count)?;
    Ok(())
}
