use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("password does not meet the strength policy: {0}")]
    WeakPassword(String),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Uniform unlock failure. Wrong password and corrupted blob are
    /// indistinguishable to the caller.
    #[error("private-key unlock failed")]
    Unlock,

    #[error("sealing failed: {0}")]
    Seal(String),

    #[error("not a recipient")]
    NotARecipient,

    #[error("payload corrupted or tampered")]
    Integrity,

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
