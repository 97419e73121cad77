//! The engine: every operation the routing layer consumes.
//!
//! Each protected operation follows the same discipline: custody lookup
//! (absence means re-authentication), capability check against the static
//! matrix, membership check against the object's recipient set, and only
//! then the cryptographic work. Denials are audited before the error
//! returns.

mod accounts;
mod decisions;
mod documents;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use docseal_access::{check, Action, AuditLog, AuditRecord, InMemoryAuditLog, RecipientSet, ResourceKind};
use docseal_core::keys::EncryptionPublicKey;
use docseal_core::{UserPublicKeys, UserSecretKeys};
use docseal_storage::{
    DecisionOutcome, DecisionStore, InMemoryDecisionStore, InMemoryObjectStore, InMemoryOtpStore,
    InMemoryUserStore, ObjectStore, OtpStore, ProtectedObject, UserRecord, UserStore,
};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::custody::KeyCustody;
use crate::error::{EngineError, EngineResult};
use crate::session::SessionRegistry;

pub struct Engine {
    pub config: EngineConfig,
    pub users: Arc<dyn UserStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub otps: Arc<dyn OtpStore>,
    pub decisions: Arc<dyn DecisionStore>,
    pub audit: Arc<dyn AuditLog>,
    pub custody: Arc<KeyCustody>,
    pub(crate) sessions: Arc<SessionRegistry>,
}

/// An authenticated caller: the user record plus the session's key bundle.
pub struct AuthContext {
    pub user: UserRecord,
    pub keys: UserSecretKeys,
}

/// Returned from registration; the code and note go to the email-delivery
/// collaborator as opaque strings.
#[derive(Debug)]
pub struct RegistrationReceipt {
    pub user_id: String,
    pub otp_code: String,
    pub otp_expires_at: u64,
    pub expiry_note: String,
}

#[derive(Debug)]
pub enum LoginOutcome {
    Complete {
        session_id: String,
    },
    /// Password accepted; a second-factor code must still be verified via
    /// `complete_login` before the session becomes usable.
    OtpRequired {
        session_id: String,
        otp_code: String,
        expiry_note: String,
    },
}

#[derive(Debug)]
pub struct SubmitReceipt {
    pub object_id: String,
    /// 1-based version number of the payload just written.
    pub version: usize,
    /// Base58 blake3 hash of the plaintext, for integrity display.
    pub content_hash: String,
}

#[derive(Debug)]
pub struct DocumentView {
    pub bytes: Vec<u8>,
    pub version: usize,
    pub content_hash: String,
}

#[derive(Debug)]
pub struct DecisionView {
    pub object_id: String,
    pub signer: String,
    pub outcome: DecisionOutcome,
    pub text: String,
    pub signed_at: u64,
    /// Authenticity is reported, never enforced: a failed verification does
    /// not block reading the decision.
    pub signature_valid: bool,
}

impl Engine {
    pub fn with_stores(
        config: EngineConfig,
        users: Arc<dyn UserStore>,
        objects: Arc<dyn ObjectStore>,
        otps: Arc<dyn OtpStore>,
        decisions: Arc<dyn DecisionStore>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            config,
            users,
            objects,
            otps,
            decisions,
            audit,
            custody: Arc::new(KeyCustody::new()),
            sessions: Arc::new(SessionRegistry::new()),
        }
    }

    /// Engine wired to in-memory backends, for tests and embedded use.
    pub fn in_memory(config: EngineConfig) -> Self {
        Self::with_stores(
            config,
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(InMemoryOtpStore::new()),
            Arc::new(InMemoryDecisionStore::new()),
            Arc::new(InMemoryAuditLog::new()),
        )
    }

    /// Start the periodic sweep of expired key handles, decoupled from any
    /// request's timeline.
    pub fn spawn_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let custody = Arc::clone(&self.custody);
        let sessions = Arc::clone(&self.sessions);
        let period = Duration::from_secs(self.config.sweep_interval_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = custody.sweep_expired();
                for session_id in &evicted {
                    sessions.remove(session_id);
                }
                if !evicted.is_empty() {
                    tracing::debug!(count = evicted.len(), "swept expired session keys");
                }
            }
        })
    }

    pub(crate) fn unix_now() -> u64 {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    pub(crate) fn new_object_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Resolve a session to its user and key bundle. A missing or expired
    /// key handle is an authentication-boundary failure.
    pub(crate) async fn authenticate(&self, session_id: &str) -> EngineResult<AuthContext> {
        let keys = self
            .custody
            .lookup(session_id)
            .ok_or(EngineError::ReauthRequired)?;
        let state = self
            .sessions
            .get(session_id)
            .ok_or(EngineError::ReauthRequired)?;

        if state.otp_pending {
            tracing::warn!("session used before second-factor verification");
            return Err(EngineError::Authentication);
        }

        let user = self
            .users
            .get(&state.user_id)
            .await?
            .ok_or(EngineError::Authentication)?;

        Ok(AuthContext { user, keys })
    }

    /// Capability-only check, for create operations where no object exists
    /// yet.
    pub(crate) async fn authorize_capability(
        &self,
        user: &UserRecord,
        resource: ResourceKind,
        action: Action,
    ) -> EngineResult<()> {
        if !check(user.role, resource, action) {
            self.audit_denial(
                &user.user_id,
                resource.as_str().to_string(),
                action,
                "role lacks capability",
            )
            .await;
            return Err(EngineError::Forbidden);
        }
        Ok(())
    }

    /// Capability plus membership. Both must pass; neither alone suffices.
    pub(crate) async fn authorize(
        &self,
        user: &UserRecord,
        object: &ProtectedObject,
        resource: ResourceKind,
        action: Action,
    ) -> EngineResult<()> {
        let resource_ref = format!("{}/{}", resource.as_str(), object.object_id);

        if !check(user.role, resource, action) {
            self.audit_denial(&user.user_id, resource_ref, action, "role lacks capability")
                .await;
            return Err(EngineError::Forbidden);
        }

        if !object.recipients.is_member(&user.user_id) {
            self.audit_denial(&user.user_id, resource_ref, action, "not a participant")
                .await;
            return Err(EngineError::Forbidden);
        }

        Ok(())
    }

    /// Append a denial or integrity event to the audit trail. A failing sink
    /// never suppresses the error being returned.
    pub(crate) async fn audit_denial(
        &self,
        actor: &str,
        resource: String,
        action: Action,
        reason: &str,
    ) {
        let record = AuditRecord {
            at: Self::unix_now(),
            actor: actor.to_string(),
            resource,
            action: action.as_str().to_string(),
            reason: reason.to_string(),
        };
        if let Err(e) = self.audit.append(record).await {
            tracing::error!(error = %e, "audit append failed");
        }
    }

    pub(crate) async fn load_object(
        &self,
        object_id: &str,
        kind: ResourceKind,
    ) -> EngineResult<ProtectedObject> {
        let object = self
            .objects
            .get(object_id)
            .await?
            .ok_or(EngineError::NotFound)?;
        if object.kind != kind {
            return Err(EngineError::NotFound);
        }
        Ok(object)
    }

    /// Collect the encryption public key of every recipient-set member.
    /// Unknown identities abort before anything is sealed, keeping the
    /// wrapped-key map equal to the recipient set.
    pub(crate) async fn recipient_keys(
        &self,
        recipients: &RecipientSet,
    ) -> EngineResult<BTreeMap<String, EncryptionPublicKey>> {
        let mut keys = BTreeMap::new();
        for member in recipients.members() {
            let user = self
                .users
                .get(member)
                .await?
                .ok_or_else(|| EngineError::Input(format!("unknown recipient: {member}")))?;
            let public = UserPublicKeys::from_encoded(&user.public_keys)
                .map_err(|e| EngineError::Internal(e.to_string()))?;
            keys.insert(member.to_string(), public.encryption);
        }
        Ok(keys)
    }
}
