//! In-memory reference backends.
//!
//! Each store wraps its map in one lock; critical sections are O(1) record
//! swaps, and the OTP verify step runs entirely inside the challenge lock so
//! two concurrent submissions cannot both observe the same attempt count.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use docseal_access::RecipientSet;
use docseal_core::{OtpChallenge, OtpOutcome, SealedPayload};

use crate::error::{StorageError, StorageResult};
use crate::traits::{DecisionStore, ObjectStore, OtpStore, UserStore};
use crate::types::{DecisionRecord, ProtectedObject, UserRecord};

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.read().unwrap().len()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: UserRecord) -> StorageResult<()> {
        let mut users = self.users.write().unwrap();
        if users.contains_key(&user.user_id) {
            return Err(StorageError::AlreadyExists(user.user_id));
        }
        users.insert(user.user_id.clone(), user);
        Ok(())
    }

    async fn get(&self, user_id: &str) -> StorageResult<Option<UserRecord>> {
        Ok(self.users.read().unwrap().get(user_id).cloned())
    }

    async fn update(&self, user: UserRecord) -> StorageResult<()> {
        let mut users = self.users.write().unwrap();
        if !users.contains_key(&user.user_id) {
            return Err(StorageError::NotFound(user.user_id));
        }
        users.insert(user.user_id.clone(), user);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<String, ProtectedObject>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_count(&self) -> usize {
        self.objects.read().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, object: ProtectedObject) -> StorageResult<()> {
        let mut objects = self.objects.write().unwrap();
        if objects.contains_key(&object.object_id) {
            return Err(StorageError::AlreadyExists(object.object_id));
        }
        objects.insert(object.object_id.clone(), object);
        Ok(())
    }

    async fn get(&self, object_id: &str) -> StorageResult<Option<ProtectedObject>> {
        Ok(self.objects.read().unwrap().get(object_id).cloned())
    }

    async fn append_version(
        &self,
        object_id: &str,
        expected_versions: usize,
        payload: SealedPayload,
    ) -> StorageResult<()> {
        let mut objects = self.objects.write().unwrap();
        let object = objects
            .get_mut(object_id)
            .ok_or_else(|| StorageError::NotFound(object_id.to_string()))?;

        if object.versions.len() != expected_versions {
            return Err(StorageError::VersionConflict {
                expected: expected_versions,
                actual: object.versions.len(),
            });
        }

        object.versions.push(payload);
        Ok(())
    }

    async fn update_recipients(
        &self,
        object_id: &str,
        recipients: RecipientSet,
    ) -> StorageResult<()> {
        let mut objects = self.objects.write().unwrap();
        let object = objects
            .get_mut(object_id)
            .ok_or_else(|| StorageError::NotFound(object_id.to_string()))?;
        object.recipients = recipients;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryOtpStore {
    challenges: Mutex<HashMap<String, OtpChallenge>>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn put(&self, challenge: OtpChallenge) -> StorageResult<()> {
        self.challenges
            .lock()
            .unwrap()
            .insert(challenge.target.clone(), challenge);
        Ok(())
    }

    async fn verify_code(
        &self,
        target: &str,
        code: &str,
        now: u64,
    ) -> StorageResult<Option<OtpOutcome>> {
        let mut challenges = self.challenges.lock().unwrap();
        Ok(challenges
            .get_mut(target)
            .map(|challenge| challenge.verify(code, now)))
    }
}

#[derive(Default)]
pub struct InMemoryDecisionStore {
    decisions: RwLock<HashMap<String, Vec<DecisionRecord>>>,
}

impl InMemoryDecisionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DecisionStore for InMemoryDecisionStore {
    async fn append(&self, decision: DecisionRecord) -> StorageResult<()> {
        self.decisions
            .write()
            .unwrap()
            .entry(decision.object_id.clone())
            .or_default()
            .push(decision);
        Ok(())
    }

    async fn list_for(&self, object_id: &str) -> StorageResult<Vec<DecisionRecord>> {
        Ok(self
            .decisions
            .read()
            .unwrap()
            .get(object_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn latest(&self, object_id: &str) -> StorageResult<Option<DecisionRecord>> {
        Ok(self
            .decisions
            .read()
            .unwrap()
            .get(object_id)
            .and_then(|list| list.last().cloned()))
    }
}
