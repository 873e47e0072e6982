//! Indexer error types.

use thiserror::Error;

pub type IndexerResult<T> = Result<T, IndexerError>;

#[derive(Debug, Error)]
pub enum IndexerError {
    /// The credential gate failed; nothing else may run.
    #[error("invalid AWS credentials")]
    InvalidCredentials,

    #[error("Storage error: {0}")]
    Storage(#[from] fdx_storage::StorageError),

    #[error("Vision error: {0}")]
    Vision(#[from] fdx_vision::VisionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
