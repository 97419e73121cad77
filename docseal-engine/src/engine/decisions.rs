//! Decision issuance and verification.

use docseal_access::{Action, ResourceKind};
use docseal_core::{sign, UserPublicKeys};
use docseal_storage::{DecisionOutcome, DecisionRecord};
use ed25519_dalek::Signature;

use super::{DecisionView, Engine};
use crate::error::{EngineError, EngineResult};

impl Engine {
    /// Sign and record a decision for a paper. A prior decision makes this a
    /// conflict unless `supersede` is set, in which case a new immutable
    /// record is appended; nothing is ever edited in place.
    pub async fn issue_decision(
        &self,
        session_id: &str,
        paper_id: &str,
        outcome: DecisionOutcome,
        text: &str,
        supersede: bool,
    ) -> EngineResult<DecisionView> {
        let ctx = self.authenticate(session_id).await?;
        let paper = self.load_object(paper_id, ResourceKind::Paper).await?;
        self.authorize(&ctx.user, &paper, ResourceKind::Decision, Action::Create)
            .await?;

        if text.trim().is_empty() {
            return Err(EngineError::Input("decision text must not be empty".into()));
        }

        if !supersede && self.decisions.latest(paper_id).await?.is_some() {
            return Err(EngineError::Conflict(
                "a decision has already been issued for this object".into(),
            ));
        }

        let signed_at = Self::unix_now();
        let payload = sign::decision_payload(paper_id, outcome.as_str(), text, signed_at);
        let signature = sign::sign_decision(&ctx.keys.signing, &payload);

        let record = DecisionRecord {
            object_id: paper_id.to_string(),
            signer: ctx.user.user_id.clone(),
            outcome,
            text: text.to_string(),
            content_hash: *blake3::hash(text.as_bytes()).as_bytes(),
            signature: bs58::encode(signature.to_bytes()).into_string(),
            signed_at,
        };
        self.decisions.append(record).await?;

        tracing::info!(paper = %paper_id, signer = %ctx.user.user_id, outcome = outcome.as_str(), "decision issued");
        Ok(DecisionView {
            object_id: paper_id.to_string(),
            signer: ctx.user.user_id,
            outcome,
            text: text.to_string(),
            signed_at,
            signature_valid: true,
        })
    }

    /// Read the latest decision. Signature verification is reported in the
    /// view; a failed verification never blocks the read.
    pub async fn read_decision(
        &self,
        session_id: &str,
        paper_id: &str,
    ) -> EngineResult<DecisionView> {
        let ctx = self.authenticate(session_id).await?;
        let paper = self.load_object(paper_id, ResourceKind::Paper).await?;
        self.authorize(&ctx.user, &paper, ResourceKind::Decision, Action::Read)
            .await?;

        let record = self
            .decisions
            .latest(paper_id)
            .await?
            .ok_or(EngineError::NotFound)?;

        let signature_valid = self.verify_decision_record(&record).await;
        if !signature_valid {
            tracing::warn!(paper = %paper_id, signer = %record.signer, "decision signature invalid");
        }

        Ok(DecisionView {
            object_id: record.object_id,
            signer: record.signer,
            outcome: record.outcome,
            text: record.text,
            signed_at: record.signed_at,
            signature_valid,
        })
    }

    /// Rebuild the canonical payload from the stored fields and verify it
    /// against the claimed signer's public key. Any divergence, missing
    /// signer, or undecodable signature yields `false`, never an error.
    async fn verify_decision_record(&self, record: &DecisionRecord) -> bool {
        let Ok(Some(signer)) = self.users.get(&record.signer).await else {
            return false;
        };
        let Ok(public) = UserPublicKeys::from_encoded(&signer.public_keys) else {
            return false;
        };
        let Ok(sig_bytes) = bs58::decode(&record.signature).into_vec() else {
            return false;
        };
        let Ok(sig_array) = <[u8; 64]>::try_from(sig_bytes.as_slice()) else {
            return false;
        };
        let signature = Signature::from_bytes(&sig_array);

        let payload = sign::decision_payload(
            &record.object_id,
            record.outcome.as_str(),
            &record.text,
            record.signed_at,
        );
        sign::verify_decision(&public.signing, &payload, &signature)
    }
}
