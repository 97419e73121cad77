//! Protected document operations: papers and reviews.

use docseal_access::{Action, RecipientSet, ResourceKind, Role};
use docseal_core::{hybrid, CoreError};
use docseal_storage::ProtectedObject;

use super::{DocumentView, Engine, SubmitReceipt};
use crate::error::{EngineError, EngineResult};

impl Engine {
    /// Submit a new paper, sealed for the author, the listed collaborators,
    /// and the handling editor.
    pub async fn submit_paper(
        &self,
        session_id: &str,
        collaborators: &[String],
        editor: &str,
        bytes: &[u8],
    ) -> EngineResult<SubmitReceipt> {
        let ctx = self.authenticate(session_id).await?;
        self.authorize_capability(&ctx.user, ResourceKind::Paper, Action::Create)
            .await?;

        let editor_user = self
            .users
            .get(editor)
            .await?
            .ok_or_else(|| EngineError::Input(format!("unknown editor: {editor}")))?;
        if editor_user.role != Role::Editor {
            return Err(EngineError::Input(
                "handling editor must hold the editor role".into(),
            ));
        }

        let recipients = RecipientSet::new(ctx.user.user_id.clone())
            .with_collaborators(collaborators.iter().cloned())
            .with_editors([editor]);

        let payload = self.seal_for_recipients(&recipients, bytes).await?;
        let content_hash = bs58::encode(payload.content_hash).into_string();

        let object = ProtectedObject {
            object_id: Self::new_object_id(),
            kind: ResourceKind::Paper,
            parent: None,
            recipients,
            versions: vec![payload],
            created_at: Self::unix_now(),
        };
        let object_id = object.object_id.clone();
        self.objects.put(object).await?;

        tracing::info!(paper = %object_id, author = %ctx.user.user_id, "paper submitted");
        Ok(SubmitReceipt {
            object_id,
            version: 1,
            content_hash,
        })
    }

    /// Write a new version, sealed for the recipient set as it stands now.
    /// The compare-and-swap on the version count turns a concurrent writer
    /// into a conflict instead of a lost update.
    pub async fn append_paper_version(
        &self,
        session_id: &str,
        paper_id: &str,
        bytes: &[u8],
    ) -> EngineResult<SubmitReceipt> {
        let ctx = self.authenticate(session_id).await?;
        let paper = self.load_object(paper_id, ResourceKind::Paper).await?;
        self.authorize(&ctx.user, &paper, ResourceKind::Paper, Action::Append)
            .await?;

        let payload = self.seal_for_recipients(&paper.recipients, bytes).await?;
        let content_hash = bs58::encode(payload.content_hash).into_string();
        let version = paper.versions.len() + 1;

        self.objects
            .append_version(paper_id, paper.versions.len(), payload)
            .await?;

        Ok(SubmitReceipt {
            object_id: paper_id.to_string(),
            version,
            content_hash,
        })
    }

    pub async fn download_paper(
        &self,
        session_id: &str,
        paper_id: &str,
        version: Option<usize>,
    ) -> EngineResult<DocumentView> {
        self.read_object(session_id, paper_id, ResourceKind::Paper, version)
            .await
    }

    /// Add a reviewer to a paper's recipient set. Only versions sealed after
    /// this point are readable by the reviewer; earlier payloads are not
    /// re-wrapped.
    pub async fn assign_reviewer(
        &self,
        session_id: &str,
        paper_id: &str,
        reviewer: &str,
    ) -> EngineResult<()> {
        let ctx = self.authenticate(session_id).await?;
        let paper = self.load_object(paper_id, ResourceKind::Paper).await?;
        self.authorize(&ctx.user, &paper, ResourceKind::Paper, Action::Assign)
            .await?;

        let reviewer_user = self
            .users
            .get(reviewer)
            .await?
            .ok_or_else(|| EngineError::Input(format!("unknown reviewer: {reviewer}")))?;
        if reviewer_user.role != Role::Reviewer {
            return Err(EngineError::Input(
                "assignee must hold the reviewer role".into(),
            ));
        }

        let mut recipients = paper.recipients.clone();
        recipients.add_reviewer(reviewer);
        self.objects
            .update_recipients(paper_id, recipients)
            .await?;

        tracing::info!(paper = %paper_id, reviewer = %reviewer, "reviewer assigned");
        Ok(())
    }

    /// Submit a review of a paper, sealed for the reviewer, the handling
    /// editors, and the paper's owner.
    pub async fn submit_review(
        &self,
        session_id: &str,
        paper_id: &str,
        bytes: &[u8],
    ) -> EngineResult<SubmitReceipt> {
        let ctx = self.authenticate(session_id).await?;
        let paper = self.load_object(paper_id, ResourceKind::Paper).await?;

        self.authorize_capability(&ctx.user, ResourceKind::Review, Action::Create)
            .await?;
        if !paper.recipients.reviewers.contains(&ctx.user.user_id) {
            self.audit_denial(
                &ctx.user.user_id,
                format!("paper/{paper_id}"),
                Action::Create,
                "not an assigned reviewer",
            )
            .await;
            return Err(EngineError::Forbidden);
        }

        let recipients = RecipientSet::new(ctx.user.user_id.clone())
            .with_collaborators([paper.recipients.owner.clone()])
            .with_editors(paper.recipients.editors.iter().cloned());

        let payload = self.seal_for_recipients(&recipients, bytes).await?;
        let content_hash = bs58::encode(payload.content_hash).into_string();

        let object = ProtectedObject {
            object_id: Self::new_object_id(),
            kind: ResourceKind::Review,
            parent: Some(paper_id.to_string()),
            recipients,
            versions: vec![payload],
            created_at: Self::unix_now(),
        };
        let object_id = object.object_id.clone();
        self.objects.put(object).await?;

        tracing::info!(review = %object_id, paper = %paper_id, reviewer = %ctx.user.user_id, "review submitted");
        Ok(SubmitReceipt {
            object_id,
            version: 1,
            content_hash,
        })
    }

    pub async fn read_review(
        &self,
        session_id: &str,
        review_id: &str,
    ) -> EngineResult<DocumentView> {
        self.read_object(session_id, review_id, ResourceKind::Review, None)
            .await
    }

    async fn seal_for_recipients(
        &self,
        recipients: &RecipientSet,
        bytes: &[u8],
    ) -> EngineResult<docseal_core::SealedPayload> {
        let keys = self.recipient_keys(recipients).await?;
        hybrid::seal_for(bytes, &keys).map_err(|e| EngineError::Internal(e.to_string()))
    }

    /// Shared read path: authenticate, capability, membership, then unwrap
    /// and decrypt. `version` is 1-based; `None` reads the latest.
    async fn read_object(
        &self,
        session_id: &str,
        object_id: &str,
        kind: ResourceKind,
        version: Option<usize>,
    ) -> EngineResult<DocumentView> {
        let ctx = self.authenticate(session_id).await?;
        let object = self.load_object(object_id, kind).await?;
        self.authorize(&ctx.user, &object, kind, Action::Read).await?;

        let index = match version {
            None => object.versions.len().saturating_sub(1),
            Some(0) => return Err(EngineError::Input("versions are numbered from 1".into())),
            Some(n) => n - 1,
        };
        let payload = object.versions.get(index).ok_or(EngineError::NotFound)?;
        let resource_ref = format!("{}/{}", kind.as_str(), object_id);

        match hybrid::open_as(payload, &ctx.user.user_id, &ctx.keys) {
            Ok(bytes) => Ok(DocumentView {
                bytes,
                version: index + 1,
                content_hash: bs58::encode(payload.content_hash).into_string(),
            }),
            Err(CoreError::NotARecipient) => {
                self.audit_denial(
                    &ctx.user.user_id,
                    resource_ref,
                    Action::Read,
                    "not a recipient of this payload version",
                )
                .await;
                Err(EngineError::Forbidden)
            }
            Err(CoreError::Integrity) => {
                self.audit_denial(
                    &ctx.user.user_id,
                    resource_ref,
                    Action::Read,
                    "authentication tag or content hash mismatch",
                )
                .await;
                Err(EngineError::Integrity)
            }
            Err(other) => Err(EngineError::Internal(other.to_string())),
        }
    }
}
