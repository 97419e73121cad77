//! Single-use, time-boxed one-time passcodes.
//!
//! State machine per challenge:
//! `Active` -> verify success -> `Consumed` (terminal);
//! `Active` -> expiry elapsed -> expired (terminal, implicit via wall clock);
//! `Active` -> attempt limit -> `Locked` (terminal).
//! Terminal states are absorbing: a second verify against one fails
//! deterministically regardless of the code supplied.

use rand::{rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};

/// Fixed code width.
pub const OTP_DIGITS: u32 = 6;

/// Mismatches allowed before the challenge locks.
pub const OTP_MAX_ATTEMPTS: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OtpState {
    Active,
    Consumed,
    Locked,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OtpChallenge {
    pub target: String,
    code: String,
    pub issued_at: u64,
    pub expires_at: u64,
    pub state: OtpState,
    pub attempts: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtpOutcome {
    Ok,
    Expired,
    AlreadyUsed,
    Locked,
    Mismatch { attempts_remaining: u32 },
}

impl OtpChallenge {
    /// Issue a fresh challenge with a uniform fixed-width numeric code.
    pub fn issue(target: &str, now: u64, ttl_secs: u64) -> Self {
        let code = OsRng.gen_range(0..10u32.pow(OTP_DIGITS));
        Self {
            target: target.to_string(),
            code: format!("{:0width$}", code, width = OTP_DIGITS as usize),
            issued_at: now,
            expires_at: now + ttl_secs,
            state: OtpState::Active,
            attempts: 0,
        }
    }

    /// The code to hand to the email-delivery collaborator.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Apply one verification attempt. The attempt-counter increment and any
    /// state transition happen in this single step; the owning store must
    /// serialize calls per challenge.
    pub fn verify(&mut self, submitted: &str, now: u64) -> OtpOutcome {
        match self.state {
            OtpState::Consumed => return OtpOutcome::AlreadyUsed,
            OtpState::Locked => return OtpOutcome::Locked,
            OtpState::Active => {}
        }

        if now > self.expires_at {
            return OtpOutcome::Expired;
        }

        if submitted == self.code {
            self.state = OtpState::Consumed;
            return OtpOutcome::Ok;
        }

        self.attempts += 1;
        if self.attempts >= OTP_MAX_ATTEMPTS {
            self.state = OtpState::Locked;
        }
        OtpOutcome::Mismatch {
            attempts_remaining: OTP_MAX_ATTEMPTS - self.attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: u64 = 300; // the 5-minute default

    #[test]
    fn test_code_is_fixed_width_numeric() {
        for _ in 0..32 {
            let challenge = OtpChallenge::issue("a@example.org", 1_000, TTL);
            assert_eq!(challenge.code().len(), OTP_DIGITS as usize);
            assert!(challenge.code().chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_correct_code_within_ttl_succeeds_once() {
        let mut challenge = OtpChallenge::issue("a@example.org", 1_000, TTL);
        let code = challenge.code().to_string();

        // Minute 2: accepted.
        assert_eq!(challenge.verify(&code, 1_000 + 120), OtpOutcome::Ok);
        // Replay thereafter: AlreadyUsed, never Ok.
        assert_eq!(challenge.verify(&code, 1_000 + 121), OtpOutcome::AlreadyUsed);
        assert_eq!(challenge.verify(&code, 1_000 + 122), OtpOutcome::AlreadyUsed);
    }

    #[test]
    fn test_expired_code_rejected() {
        let mut challenge = OtpChallenge::issue("a@example.org", 1_000, TTL);
        let code = challenge.code().to_string();

        // Minute 6 on a 5-minute challenge.
        assert_eq!(challenge.verify(&code, 1_000 + 360), OtpOutcome::Expired);
        assert_eq!(challenge.verify(&code, 1_000 + 400), OtpOutcome::Expired);
    }

    #[test]
    fn test_mismatch_counts_down_then_locks() {
        let mut challenge = OtpChallenge::issue("a@example.org", 1_000, TTL);
        let code = challenge.code().to_string();
        let wrong = if code == "000000" { "000001" } else { "000000" };

        assert_eq!(
            challenge.verify(wrong, 1_001),
            OtpOutcome::Mismatch { attempts_remaining: 2 }
        );
        assert_eq!(
            challenge.verify(wrong, 1_002),
            OtpOutcome::Mismatch { attempts_remaining: 1 }
        );
        assert_eq!(
            challenge.verify(wrong, 1_003),
            OtpOutcome::Mismatch { attempts_remaining: 0 }
        );

        // Even the correct code is refused once locked.
        assert_eq!(challenge.verify(&code, 1_004), OtpOutcome::Locked);
        assert_eq!(challenge.verify(&code, 1_005), OtpOutcome::Locked);
    }

    #[test]
    fn test_consumed_stays_consumed_after_expiry() {
        let mut challenge = OtpChallenge::issue("a@example.org", 1_000, TTL);
        let code = challenge.code().to_string();

        assert_eq!(challenge.verify(&code, 1_010), OtpOutcome::Ok);
        // Terminal state wins over the elapsed clock.
        assert_eq!(challenge.verify(&code, 1_000 + 400), OtpOutcome::AlreadyUsed);
    }
}
