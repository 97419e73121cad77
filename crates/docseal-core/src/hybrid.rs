//! Hybrid envelope encryption with per-recipient key wrapping.
//!
//! Each seal generates a fresh symmetric key and nonce, encrypts the payload
//! with XChaCha20-Poly1305 in one authenticated pass, and wraps the symmetric
//! key once per recipient with an ephemeral-sender X25519 box. The blake3
//! content hash is computed over the plaintext independently of the AEAD tag
//! and is what user-facing integrity displays show.
//!
//! Known limitation: a recipient added to an object after a payload was
//! sealed has no wrapped-key entry in that payload and cannot read it; only
//! versions sealed after the addition are readable. Prior versions are never
//! re-wrapped.

use std::collections::BTreeMap;

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305,
};
use crypto_box::SalsaBox;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{CoreError, CoreResult};
use crate::keys::{EncryptionPublicKey, EncryptionSecretKey, UserSecretKeys};

/// Symmetric key length, fixed system-wide.
pub const SYMMETRIC_KEY_LEN: usize = 32;
/// XChaCha20 extended nonce length (birthday-safe random generation).
pub const NONCE_LEN: usize = 24;

/// One recipient's encrypted copy of a payload's symmetric key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WrappedKey {
    /// Ephemeral sender public key for the X25519 agreement.
    pub ephemeral_pk: [u8; 32],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

/// An encrypted payload version as persisted by the storage collaborator.
///
/// The AEAD tag rides at the tail of `ciphertext`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SealedPayload {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_LEN],
    /// Blake3 hash of the plaintext, for user-facing integrity display.
    pub content_hash: [u8; 32],
    /// Recipient identity -> wrapped symmetric key. The key set equals the
    /// object's recipient set at seal time.
    pub wrapped_keys: BTreeMap<String, WrappedKey>,
}

impl SealedPayload {
    pub fn is_recipient(&self, identity: &str) -> bool {
        self.wrapped_keys.contains_key(identity)
    }
}

/// Seal `plaintext` for every listed recipient.
pub fn seal_for(
    plaintext: &[u8],
    recipients: &BTreeMap<String, EncryptionPublicKey>,
) -> CoreResult<SealedPayload> {
    if recipients.is_empty() {
        return Err(CoreError::Seal("empty recipient set".into()));
    }

    let mut sym_key = Zeroizing::new([0u8; SYMMETRIC_KEY_LEN]);
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(sym_key.as_mut());
    OsRng.fill_bytes(&mut nonce);

    let content_hash = *blake3::hash(plaintext).as_bytes();

    let cipher = XChaCha20Poly1305::new_from_slice(sym_key.as_ref())
        .map_err(|e| CoreError::Seal(e.to_string()))?;
    let ciphertext = cipher
        .encrypt(&nonce.into(), plaintext)
        .map_err(|_| CoreError::Seal("payload encryption failed".into()))?;

    let mut wrapped_keys = BTreeMap::new();
    for (identity, public_key) in recipients {
        wrapped_keys.insert(identity.clone(), wrap_key(public_key, &sym_key)?);
    }

    Ok(SealedPayload {
        ciphertext,
        nonce,
        content_hash,
        wrapped_keys,
    })
}

/// Unwrap and decrypt a payload as `recipient`.
///
/// An absent wrapped-key entry means the caller is not a recipient, which is
/// distinct from the object not existing. Tag verification happens inside the
/// AEAD decrypt; no plaintext is returned on failure.
pub fn open_as(
    payload: &SealedPayload,
    recipient: &str,
    keys: &UserSecretKeys,
) -> CoreResult<Vec<u8>> {
    let wrapped = payload
        .wrapped_keys
        .get(recipient)
        .ok_or(CoreError::NotARecipient)?;

    let sym_key = unwrap_key(wrapped, &keys.encryption)?;

    let cipher = XChaCha20Poly1305::new_from_slice(sym_key.as_ref())
        .map_err(|_| CoreError::Integrity)?;
    let plaintext = cipher
        .decrypt(&payload.nonce.into(), payload.ciphertext.as_slice())
        .map_err(|_| CoreError::Integrity)?;

    // Cross-check the user-facing content hash against what we decrypted.
    if *blake3::hash(&plaintext).as_bytes() != payload.content_hash {
        return Err(CoreError::Integrity);
    }

    Ok(plaintext)
}

fn wrap_key(
    recipient: &EncryptionPublicKey,
    sym_key: &[u8; SYMMETRIC_KEY_LEN],
) -> CoreResult<WrappedKey> {
    let ephemeral = EncryptionSecretKey::generate(&mut OsRng);
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let sealer = SalsaBox::new(recipient, &ephemeral);
    let ciphertext = sealer
        .encrypt(crypto_box::Nonce::from_slice(&nonce), &sym_key[..])
        .map_err(|_| CoreError::Seal("key wrapping failed".into()))?;

    Ok(WrappedKey {
        ephemeral_pk: *ephemeral.public_key().as_bytes(),
        nonce,
        ciphertext,
    })
}

fn unwrap_key(
    wrapped: &WrappedKey,
    secret: &EncryptionSecretKey,
) -> CoreResult<Zeroizing<[u8; SYMMETRIC_KEY_LEN]>> {
    let ephemeral_pk = EncryptionPublicKey::from(wrapped.ephemeral_pk);
    let opener = SalsaBox::new(&ephemeral_pk, secret);
    let bytes = opener
        .decrypt(
            crypto_box::Nonce::from_slice(&wrapped.nonce),
            wrapped.ciphertext.as_slice(),
        )
        .map_err(|_| CoreError::Integrity)?;

    let key: [u8; SYMMETRIC_KEY_LEN] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| CoreError::Integrity)?;
    Ok(Zeroizing::new(key))
}
