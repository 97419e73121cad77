//! Session-scoped custody of decrypted private keys.
//!
//! An injectable service owning the map from session id to decrypted key
//! bundle. Handles live only in volatile memory, are bound with a TTL at
//! login, and are the first thing erased on any session-ending event.
//! Expiry is checked at use time; detecting an expired handle evicts it as a
//! side effect, so no stale entry lingers behind a `None`.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use docseal_core::UserSecretKeys;

struct KeyHandle {
    keys: UserSecretKeys,
    expires_at: Instant,
}

#[derive(Default)]
pub struct KeyCustody {
    handles: RwLock<HashMap<String, KeyHandle>>,
}

impl KeyCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a decrypted key bundle to a session, replacing any prior handle.
    pub fn bind(&self, session_id: &str, keys: UserSecretKeys, ttl: Duration) {
        let handle = KeyHandle {
            keys,
            expires_at: Instant::now() + ttl,
        };
        self.handles
            .write()
            .unwrap()
            .insert(session_id.to_string(), handle);
    }

    /// Fetch the session's keys, or `None` once the TTL has passed. An
    /// expired entry is evicted before `None` is returned.
    pub fn lookup(&self, session_id: &str) -> Option<UserSecretKeys> {
        {
            let handles = self.handles.read().unwrap();
            match handles.get(session_id) {
                None => return None,
                Some(handle) if handle.expires_at > Instant::now() => {
                    return Some(handle.keys.clone());
                }
                Some(_) => {}
            }
        }

        let mut handles = self.handles.write().unwrap();
        if let Some(handle) = handles.get(session_id) {
            // Re-check under the write lock; a concurrent bind may have
            // refreshed the handle between the two lock scopes.
            if handle.expires_at > Instant::now() {
                return Some(handle.keys.clone());
            }
            handles.remove(session_id);
        }
        None
    }

    /// Idempotent; called unconditionally on logout.
    pub fn release(&self, session_id: &str) {
        self.handles.write().unwrap().remove(session_id);
    }

    /// Evict every expired handle, returning the evicted session ids.
    ///
    /// Candidates are collected under a read lock; each eviction then runs in
    /// its own short write section, so concurrent lookups are never stalled
    /// behind a full scan.
    pub fn sweep_expired(&self) -> Vec<String> {
        let now = Instant::now();
        let candidates: Vec<String> = self
            .handles
            .read()
            .unwrap()
            .iter()
            .filter(|(_, handle)| handle.expires_at <= now)
            .map(|(id, _)| id.clone())
            .collect();

        let mut evicted = Vec::new();
        for session_id in candidates {
            let mut handles = self.handles.write().unwrap();
            if let Some(handle) = handles.get(&session_id) {
                if handle.expires_at <= Instant::now() {
                    handles.remove(&session_id);
                    evicted.push(session_id);
                }
            }
        }
        evicted
    }

    pub fn live_handles(&self) -> usize {
        self.handles.read().unwrap().len()
    }
}
