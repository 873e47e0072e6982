//! Vision error types.

use thiserror::Error;

/// Result type for vision operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors that can occur while talking to the face collection service.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Collection operation failed: {0}")]
    CollectionFailed(String),

    #[error("Face search failed: {0}")]
    SearchFailed(String),

    #[error("Face indexing failed: {0}")]
    IndexFailed(String),

    #[error("AWS SDK error: {0}")]
    AwsSdk(String),
}

impl VisionError {
    pub fn collection_failed(msg: impl Into<String>) -> Self {
        Self::CollectionFailed(msg.into())
    }

    pub fn search_failed(msg: impl Into<String>) -> Self {
        Self::SearchFailed(msg.into())
    }

    pub fn index_failed(msg: impl Into<String>) -> Self {
        Self::IndexFailed(msg.into())
    }
}
