//! docseal-access: authorization for protected documents
//!
//! Two orthogonal checks guard every operation:
//!
//! - **Capability** (`acm::check`): can this *role* ever perform this action
//!   on this resource type? A static table, fail-closed.
//! - **Membership** (`RecipientSet::is_member`): is this *user* a listed
//!   participant of this specific object?
//!
//! Both must pass; neither alone is sufficient. Possession of a wrapped
//! payload key is a confidentiality mechanism and is never consulted for
//! authorization. Every denial is recorded on the append-only audit trail.

mod acm;
mod audit;
mod error;
mod recipients;

pub use acm::{check, Action, ResourceKind, Role};
pub use audit::{AuditLog, AuditRecord, InMemoryAuditLog};
pub use error::{AccessError, AccessResult};
pub use recipients::{RecipientSet, UserId};
