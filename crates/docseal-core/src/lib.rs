//! # docseal-core: cryptographic custody for multi-party documents
//!
//! This crate provides the cryptographic operations of the docseal engine:
//!
//! - **Credential vault**: a user's private keys sealed at rest under an
//!   Argon2id password-derived wrapping key
//! - **Hybrid encryption**: per-object XChaCha20-Poly1305 with the symmetric
//!   key wrapped once per recipient (X25519)
//! - **OTP challenges**: single-use, time-boxed numeric codes
//! - **Decision signatures**: Ed25519 over a canonical field serialization
//!
//! ## Example: seal for two recipients
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use docseal_core::{hybrid, keys::UserSecretKeys};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let alice = UserSecretKeys::generate();
//! let bob = UserSecretKeys::generate();
//!
//! let mut recipients = BTreeMap::new();
//! recipients.insert("alice@example.org".into(), alice.public_keys().encryption);
//! recipients.insert("bob@example.org".into(), bob.public_keys().encryption);
//!
//! let payload = hybrid::seal_for(b"hello", &recipients)?;
//!
//! let plaintext = hybrid::open_as(&payload, "bob@example.org", &bob)?;
//! assert_eq!(&plaintext[..], b"hello");
//! # Ok(())
//! # }
//! ```
//!
//! Ciphertexts are non-deterministic by design (fresh key and nonce per
//! seal); tests assert semantic behavior, not byte equality.

pub mod error;
pub mod hybrid;
pub mod keys;
pub mod otp;
pub mod password;
pub mod sign;
pub mod vault;

// Re-exports for convenience
pub use error::{CoreError, CoreResult};
pub use hybrid::{open_as, seal_for, SealedPayload, WrappedKey};
pub use keys::{EncodedPublicKeys, UserPublicKeys, UserSecretKeys};
pub use otp::{OtpChallenge, OtpOutcome, OtpState};
pub use vault::{register_credential, unlock_private_key, CredentialBundle};
