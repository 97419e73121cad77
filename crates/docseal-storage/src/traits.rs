//! Store contracts consumed by the engine.

use async_trait::async_trait;
use docseal_access::RecipientSet;
use docseal_core::{OtpChallenge, OtpOutcome, SealedPayload};

use crate::error::StorageResult;
use crate::types::{DecisionRecord, ProtectedObject, UserRecord};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a new user; errors if the identity is already taken.
    async fn create(&self, user: UserRecord) -> StorageResult<()>;

    async fn get(&self, user_id: &str) -> StorageResult<Option<UserRecord>>;

    /// Replace the whole record; errors if the user does not exist.
    async fn update(&self, user: UserRecord) -> StorageResult<()>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a new object; errors if the id is already taken.
    async fn put(&self, object: ProtectedObject) -> StorageResult<()>;

    async fn get(&self, object_id: &str) -> StorageResult<Option<ProtectedObject>>;

    /// Append a payload version iff the object currently has exactly
    /// `expected_versions` versions. The compare-and-swap serializes
    /// concurrent writers; a mismatch is a conflict, never a second
    /// valid-looking version.
    async fn append_version(
        &self,
        object_id: &str,
        expected_versions: usize,
        payload: SealedPayload,
    ) -> StorageResult<()>;

    /// Replace the recipient set. Affects only versions sealed afterwards;
    /// existing payloads are not re-wrapped.
    async fn update_recipients(
        &self,
        object_id: &str,
        recipients: RecipientSet,
    ) -> StorageResult<()>;
}

#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Store a challenge for a target, replacing any prior one. At most one
    /// challenge is active per target.
    async fn put(&self, challenge: OtpChallenge) -> StorageResult<()>;

    /// Apply one verification attempt atomically (counter increment and
    /// state transition as a single step per challenge). `None` means no
    /// challenge exists for the target.
    async fn verify_code(
        &self,
        target: &str,
        code: &str,
        now: u64,
    ) -> StorageResult<Option<OtpOutcome>>;
}

#[async_trait]
pub trait DecisionStore: Send + Sync {
    async fn append(&self, decision: DecisionRecord) -> StorageResult<()>;

    /// All decisions for an object, in issuance order.
    async fn list_for(&self, object_id: &str) -> StorageResult<Vec<DecisionRecord>>;

    /// The most recently issued decision, if any.
    async fn latest(&self, object_id: &str) -> StorageResult<Option<DecisionRecord>>;
}
