//! Account lifecycle: registration, activation, login, logout.

use std::time::Duration;

use docseal_access::Role;
use docseal_core::{otp::OtpChallenge, vault, CoreError, OtpOutcome};
use docseal_storage::UserRecord;

use super::{Engine, LoginOutcome, RegistrationReceipt};
use crate::error::{EngineError, EngineResult};
use crate::session;

impl Engine {
    /// Create an account: derive and seal the key bundle, store the user
    /// unverified, and issue the activation code for the email collaborator.
    pub async fn register(
        &self,
        email: &str,
        role: Role,
        password: &str,
    ) -> EngineResult<RegistrationReceipt> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(EngineError::Input("invalid email address".into()));
        }

        // Strength policy runs before any key derivation.
        let credential = vault::register_credential(password).map_err(|e| match e {
            CoreError::WeakPassword(msg) => EngineError::Input(msg),
            other => EngineError::Internal(other.to_string()),
        })?;
        let password_hash = vault::hash_login_password(password)
            .map_err(|e| EngineError::Internal(e.to_string()))?;

        let now = Self::unix_now();
        let user = UserRecord {
            user_id: email.to_string(),
            role,
            password_hash,
            public_keys: credential.public_keys.to_encoded(),
            encrypted_private_key: credential.encrypted_private_key,
            kdf_salt: credential.kdf_salt,
            failed_logins: 0,
            locked_until: 0,
            email_verified: false,
            created_at: now,
        };
        self.users.create(user).await.map_err(|e| match e {
            docseal_storage::StorageError::AlreadyExists(_) => {
                EngineError::Conflict("account already exists".into())
            }
            other => EngineError::from(other),
        })?;

        let challenge = OtpChallenge::issue(email, now, self.config.otp_ttl_secs);
        let otp_code = challenge.code().to_string();
        let otp_expires_at = challenge.expires_at;
        self.otps.put(challenge).await?;

        tracing::info!(user = %email, "account registered, activation pending");
        Ok(RegistrationReceipt {
            user_id: email.to_string(),
            otp_code,
            otp_expires_at,
            expiry_note: format!("code expires in {} minutes", self.config.otp_ttl_secs / 60),
        })
    }

    /// Single-use activation: consumes the challenge and flips the
    /// email-verified flag.
    pub async fn confirm_registration(&self, email: &str, code: &str) -> EngineResult<()> {
        let outcome = self.otps.verify_code(email, code, Self::unix_now()).await?;

        match outcome {
            Some(OtpOutcome::Ok) => {
                let mut user = self
                    .users
                    .get(email)
                    .await?
                    .ok_or(EngineError::Authentication)?;
                user.email_verified = true;
                self.users.update(user).await?;
                tracing::info!(user = %email, "account activated");
                Ok(())
            }
            other => {
                tracing::warn!(user = %email, outcome = ?other, "activation code rejected");
                Err(EngineError::Authentication)
            }
        }
    }

    /// Password login. On success the private key is unlocked into session
    /// custody; with `otp_on_login` the session stays pending until
    /// [`Engine::complete_login`] verifies the second factor.
    pub async fn login(&self, email: &str, password: &str) -> EngineResult<LoginOutcome> {
        let now = Self::unix_now();
        let Some(mut user) = self.users.get(email).await? else {
            tracing::warn!("login attempt for unknown identity");
            return Err(EngineError::Authentication);
        };

        if user.locked_until > now {
            tracing::warn!(user = %email, "login attempt while locked out");
            return Err(EngineError::Authentication);
        }
        if !user.email_verified {
            tracing::warn!(user = %email, "login attempt before activation");
            return Err(EngineError::Authentication);
        }

        if !vault::verify_login_password(password, &user.password_hash) {
            user.failed_logins += 1;
            if user.failed_logins >= self.config.max_failed_logins {
                user.locked_until = now + self.config.lockout_secs;
                user.failed_logins = 0;
                tracing::warn!(user = %email, until = user.locked_until, "account locked out");
            }
            self.users.update(user).await?;
            return Err(EngineError::Authentication);
        }

        if user.failed_logins != 0 || user.locked_until != 0 {
            user.failed_logins = 0;
            user.locked_until = 0;
            self.users.update(user.clone()).await?;
        }

        let keys = vault::unlock_private_key(password, &user.kdf_salt, &user.encrypted_private_key)
            .map_err(|_| {
                tracing::warn!(user = %email, "private-key unlock failed");
                EngineError::Authentication
            })?;

        let session_id = session::new_session_id();
        self.custody.bind(
            &session_id,
            keys,
            Duration::from_secs(self.config.session_ttl_secs),
        );

        if self.config.otp_on_login {
            let challenge = OtpChallenge::issue(email, now, self.config.otp_ttl_secs);
            let otp_code = challenge.code().to_string();
            self.otps.put(challenge).await?;
            self.sessions.insert(&session_id, email, true);
            Ok(LoginOutcome::OtpRequired {
                session_id,
                otp_code,
                expiry_note: format!("code expires in {} minutes", self.config.otp_ttl_secs / 60),
            })
        } else {
            self.sessions.insert(&session_id, email, false);
            tracing::info!(user = %email, "login complete");
            Ok(LoginOutcome::Complete { session_id })
        }
    }

    /// Verify the step-two code. A mismatch leaves the session pending (the
    /// challenge's own attempt limit applies); any terminal outcome erases
    /// the half-open session and its key handle.
    pub async fn complete_login(&self, session_id: &str, code: &str) -> EngineResult<()> {
        let state = self
            .sessions
            .get(session_id)
            .ok_or(EngineError::ReauthRequired)?;
        if !state.otp_pending {
            return Err(EngineError::Conflict("login already completed".into()));
        }

        let outcome = self
            .otps
            .verify_code(&state.user_id, code, Self::unix_now())
            .await?;

        match outcome {
            Some(OtpOutcome::Ok) => {
                self.sessions.mark_verified(session_id);
                tracing::info!(user = %state.user_id, "login complete");
                Ok(())
            }
            Some(OtpOutcome::Mismatch { attempts_remaining }) => {
                tracing::warn!(user = %state.user_id, attempts_remaining, "login code mismatch");
                Err(EngineError::Authentication)
            }
            other => {
                // Expired, locked, replayed, or missing: the key handle goes
                // first, then the session record.
                self.custody.release(session_id);
                self.sessions.remove(session_id);
                tracing::warn!(user = %state.user_id, outcome = ?other, "login code terminal failure");
                Err(EngineError::Authentication)
            }
        }
    }

    /// Unconditional and idempotent; the key handle is erased whether or not
    /// one exists.
    pub async fn logout(&self, session_id: &str) {
        self.custody.release(session_id);
        self.sessions.remove(session_id);
    }
}
