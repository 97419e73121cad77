//! docseal-storage: persisted record shapes and store contracts
//!
//! The persistent engine itself is an external collaborator; this crate
//! defines the whole-record store traits the engine consumes, the record
//! types it persists verbatim, and in-memory reference backends used by
//! tests and embedded deployments.

mod error;
mod memory;
mod traits;
mod types;

pub use error::{StorageError, StorageResult};
pub use memory::{
    InMemoryDecisionStore, InMemoryObjectStore, InMemoryOtpStore, InMemoryUserStore,
};
pub use traits::{DecisionStore, ObjectStore, OtpStore, UserStore};
pub use types::{DecisionOutcome, DecisionRecord, ProtectedObject, UserRecord};
