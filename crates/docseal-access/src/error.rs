use thiserror::Error;

pub type AccessResult<T> = Result<T, AccessError>;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("audit sink failure: {0}")]
    Sink(String),
}
