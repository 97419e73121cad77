//! Session bookkeeping: which user a session belongs to and whether a
//! step-two OTP is still outstanding. Key material itself lives in
//! [`crate::custody::KeyCustody`], never here.

use std::collections::HashMap;
use std::sync::RwLock;

use docseal_access::UserId;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct SessionState {
    pub user_id: UserId,
    /// True until the login OTP verifies; protected operations refuse
    /// pending sessions.
    pub otp_pending: bool,
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionState>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session_id: &str, user_id: &str, otp_pending: bool) {
        self.sessions.write().unwrap().insert(
            session_id.to_string(),
            SessionState {
                user_id: user_id.to_string(),
                otp_pending,
            },
        );
    }

    pub fn get(&self, session_id: &str) -> Option<SessionState> {
        self.sessions.read().unwrap().get(session_id).cloned()
    }

    pub fn mark_verified(&self, session_id: &str) {
        if let Some(state) = self.sessions.write().unwrap().get_mut(session_id) {
            state.otp_pending = false;
        }
    }

    pub fn remove(&self, session_id: &str) {
        self.sessions.write().unwrap().remove(session_id);
    }
}

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}
