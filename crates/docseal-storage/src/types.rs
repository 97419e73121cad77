//! Persisted record shapes.
//!
//! Records are read and written whole; the engine never assumes partial-field
//! updates beyond the versioned-append contract on `ProtectedObject`.

use docseal_access::{RecipientSet, ResourceKind, Role, UserId};
use docseal_core::{EncodedPublicKeys, SealedPayload};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    pub role: Role,
    /// PHC string for login verification.
    pub password_hash: String,
    pub public_keys: EncodedPublicKeys,
    /// Immutable once set; no rotation.
    pub encrypted_private_key: Vec<u8>,
    pub kdf_salt: [u8; 32],
    pub failed_logins: u32,
    /// Unix seconds; 0 = not locked.
    pub locked_until: u64,
    pub email_verified: bool,
    pub created_at: u64,
}

/// A paper or review: recipient set plus an append-only version list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProtectedObject {
    pub object_id: String,
    pub kind: ResourceKind,
    /// For reviews, the paper under review.
    pub parent: Option<String>,
    pub recipients: RecipientSet,
    /// Ordered payload versions; entries are never mutated in place.
    pub versions: Vec<SealedPayload>,
    pub created_at: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionOutcome {
    Accept,
    MinorRevision,
    MajorRevision,
    Reject,
}

impl DecisionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionOutcome::Accept => "accept",
            DecisionOutcome::MinorRevision => "minor-revision",
            DecisionOutcome::MajorRevision => "major-revision",
            DecisionOutcome::Reject => "reject",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "accept" => Some(DecisionOutcome::Accept),
            "minor-revision" => Some(DecisionOutcome::MinorRevision),
            "major-revision" => Some(DecisionOutcome::MajorRevision),
            "reject" => Some(DecisionOutcome::Reject),
            _ => None,
        }
    }
}

/// Immutable once created; a later decision supersedes rather than edits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub object_id: String,
    pub signer: UserId,
    pub outcome: DecisionOutcome,
    pub text: String,
    /// Blake3 hash of the decision text.
    pub content_hash: [u8; 32],
    /// Base58 Ed25519 signature over the canonical decision payload.
    pub signature: String,
    pub signed_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_parse_roundtrip() {
        for outcome in [
            DecisionOutcome::Accept,
            DecisionOutcome::MinorRevision,
            DecisionOutcome::MajorRevision,
            DecisionOutcome::Reject,
        ] {
            assert_eq!(DecisionOutcome::parse(outcome.as_str()), Some(outcome));
        }
        assert_eq!(DecisionOutcome::parse("tabled"), None);
    }
}
