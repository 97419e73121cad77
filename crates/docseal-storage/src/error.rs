use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Compare-and-swap failure on a versioned append.
    #[error("version conflict: expected {expected} versions, found {actual}")]
    VersionConflict { expected: usize, actual: usize },

    #[error("backend error: {0}")]
    Backend(String),
}
