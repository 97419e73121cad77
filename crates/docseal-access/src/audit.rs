//! Append-only audit trail.
//!
//! Authorization denials and integrity failures are appended here before the
//! error returns to the caller. A failing sink must never suppress the
//! original error; callers log the sink failure and propagate the denial.

use std::sync::RwLock;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{AccessError, AccessResult};

#[derive(Clone, Debug, Serialize)]
pub struct AuditRecord {
    /// Unix seconds.
    pub at: u64,
    pub actor: String,
    pub resource: String,
    pub action: String,
    pub reason: String,
}

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, record: AuditRecord) -> AccessResult<()>;
}

/// In-memory trail for tests and embedded use.
#[derive(Default)]
pub struct InMemoryAuditLog {
    records: RwLock<Vec<AuditRecord>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.read().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(&self, record: AuditRecord) -> AccessResult<()> {
        tracing::warn!(
            actor = %record.actor,
            resource = %record.resource,
            action = %record.action,
            reason = %record.reason,
            "access denied"
        );
        self.records
            .write()
            .map_err(|e| AccessError::Sink(e.to_string()))?
            .push(record);
        Ok(())
    }
}
