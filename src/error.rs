//! Error handling
//!
//! Every error leaving the crate carries one of the `ErrorKind` classes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::features::LayoutMismatchError;

pub type Result<T> = std::result::Result<T, BidAnomalyError>;

#[derive(Debug, Error)]
pub enum BidAnomalyError {
    /// Feature extraction lacks the context it needs (tender, history, ...)
    #[error("Insufficient context: {0}")]
    InsufficientContext(String),

    /// Vector and model disagree on the feature schema
    #[error(transparent)]
    SchemaMismatch(#[from] LayoutMismatchError),

    /// Vector fits the schema but carries NaN or infinite values
    #[error("Invalid feature vector: {0}")]
    InvalidVector(String),

    /// Retrain abandoned; the current model stays authoritative
    #[error("Training aborted: {0}")]
    TrainingAborted(String),

    /// Snapshot failed to deserialize or failed its self-check
    #[error("Corrupt model {version}: {reason}")]
    CorruptModel { version: String, reason: String },

    /// Nothing has been published yet
    #[error("No model has been published")]
    ModelUnavailable,

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Classified error kind (for status reporting and audit logs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InsufficientContext,
    SchemaMismatch,
    InvalidVector,
    TrainingAborted,
    CorruptModel,
    ModelUnavailable,
    Storage,
    Serialization,
}

impl BidAnomalyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BidAnomalyError::InsufficientContext(_) => ErrorKind::InsufficientContext,
            BidAnomalyError::SchemaMismatch(_) => ErrorKind::SchemaMismatch,
            BidAnomalyError::InvalidVector(_) => ErrorKind::InvalidVector,
            BidAnomalyError::TrainingAborted(_) => ErrorKind::TrainingAborted,
            BidAnomalyError::CorruptModel { .. } => ErrorKind::CorruptModel,
            BidAnomalyError::ModelUnavailable => ErrorKind::ModelUnavailable,
            BidAnomalyError::Storage(_) => ErrorKind::Storage,
            BidAnomalyError::Serialization(_) => ErrorKind::Serialization,
        }
    }

    pub(crate) fn insufficient(msg: impl Into<String>) -> Self {
        BidAnomalyError::InsufficientContext(msg.into())
    }

    pub(crate) fn invalid_vector(msg: impl Into<String>) -> Self {
        BidAnomalyError::InvalidVector(msg.into())
    }

    pub(crate) fn aborted(msg: impl Into<String>) -> Self {
        BidAnomalyError::TrainingAborted(msg.into())
    }

    pub(crate) fn corrupt(version: impl Into<String>, reason: impl Into<String>) -> Self {
        BidAnomalyError::CorruptModel {
            version: version.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            BidAnomalyError::insufficient("no tender").kind(),
            ErrorKind::InsufficientContext
        );
        assert_eq!(BidAnomalyError::invalid_vector("NaN").kind(), ErrorKind::InvalidVector);
        assert_eq!(BidAnomalyError::aborted("too few").kind(), ErrorKind::TrainingAborted);
        assert_eq!(BidAnomalyError::corrupt("v1", "bad").kind(), ErrorKind::CorruptModel);
        assert_eq!(BidAnomalyError::ModelUnavailable.kind(), ErrorKind::ModelUnavailable);

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert_eq!(BidAnomalyError::from(io).kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_error_display() {
        let err = BidAnomalyError::corrupt("v42", "checksum mismatch");
        assert_eq!(err.to_string(), "Corrupt model v42: checksum mismatch");
    }
}
