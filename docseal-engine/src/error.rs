//! Engine error taxonomy.
//!
//! Authentication failures carry no root cause in their display; the detail
//! is logged server-side. Authorization denials and integrity failures are
//! written to the audit trail before these errors are returned.

use docseal_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed or missing fields, weak password, unsupported role.
    /// Locally recoverable, surfaced immediately.
    #[error("invalid input: {0}")]
    Input(String),

    /// Bad credentials, unverified account, expired/used/locked OTP. The
    /// message deliberately does not say which.
    #[error("authentication failed")]
    Authentication,

    /// No valid session-key handle; never a silent no-op.
    #[error("re-authentication required")]
    ReauthRequired,

    /// Capability or membership denial. Details go to the audit trail only.
    #[error("forbidden")]
    Forbidden,

    /// Authentication-tag or hash mismatch on decrypt. Fatal for that read.
    #[error("corrupted or tampered payload")]
    Integrity,

    /// State conflicts: duplicate account, already-issued decision, lost
    /// version race. Not retried automatically.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found")]
    NotFound,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AlreadyExists(what) => EngineError::Conflict(what),
            StorageError::NotFound(_) => EngineError::NotFound,
            StorageError::VersionConflict { expected, actual } => EngineError::Conflict(format!(
                "version conflict: expected {expected} versions, found {actual}"
            )),
            StorageError::Backend(msg) => EngineError::Storage(msg),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
