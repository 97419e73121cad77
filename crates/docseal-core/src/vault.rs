//! Credential vault: password-derived custody of a user's private keys.
//!
//! The secret bundle is serialized, then sealed with XChaCha20-Poly1305 under
//! an Argon2id-derived wrapping key. No plaintext private key ever reaches
//! persistent storage; the caller stores only the blob, the salt, and the
//! public halves.
//!
//! Blob layout: `magic || version || salt(32) || nonce(24) || ciphertext`
//! (the AEAD tag rides at the end of the ciphertext).

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305,
};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

use crate::error::{CoreError, CoreResult};
use crate::keys::{EncodedSecretKeys, UserPublicKeys, UserSecretKeys};
use crate::password;

const MAGIC: &[u8; 4] = b"DSLV";
const VERSION: u8 = 1;

// Argon2 params (OWASP recommendations)
const ARGON2_M_COST: u32 = 65536; // 64 MiB
const ARGON2_T_COST: u32 = 3; // 3 iterations
const ARGON2_P_COST: u32 = 4; // 4 parallelism

pub const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = 4 + 1 + SALT_LEN;

/// Everything registration persists for a new user's keys.
#[derive(Debug)]
pub struct CredentialBundle {
    pub public_keys: UserPublicKeys,
    pub encrypted_private_key: Vec<u8>,
    pub kdf_salt: [u8; SALT_LEN],
}

/// Generate a fresh key bundle and seal its secret halves under `password`.
///
/// The strength policy runs before any cryptographic work.
pub fn register_credential(password: &str) -> CoreResult<CredentialBundle> {
    password::check_strength(password)?;

    let secret = UserSecretKeys::generate();
    let public_keys = secret.public_keys();

    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let key = derive_wrapping_key(password, &salt)?;
    let plaintext = Zeroizing::new(
        serde_json::to_vec(&secret.to_encoded())
            .map_err(|e| CoreError::Serialization(e.to_string()))?,
    );

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let cipher = XChaCha20Poly1305::new_from_slice(key.as_ref())
        .map_err(|e| CoreError::KeyDerivation(e.to_string()))?;
    let ciphertext = cipher
        .encrypt(&nonce.into(), plaintext.as_slice())
        .map_err(|_| CoreError::Seal("private-key blob encryption failed".into()))?;

    let mut blob = Vec::with_capacity(HEADER_LEN + NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(MAGIC);
    blob.push(VERSION);
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);

    Ok(CredentialBundle {
        public_keys,
        encrypted_private_key: blob,
        kdf_salt: salt,
    })
}

/// Decrypt the secret bundle with the user's password.
///
/// Every failure mode (wrong password, truncated or corrupted blob, salt
/// mismatch) maps to the same `CoreError::Unlock` so the caller cannot tell
/// them apart.
pub fn unlock_private_key(
    password: &str,
    salt: &[u8; SALT_LEN],
    blob: &[u8],
) -> CoreResult<UserSecretKeys> {
    if blob.len() < HEADER_LEN + NONCE_LEN + TAG_LEN {
        return Err(CoreError::Unlock);
    }
    if &blob[0..4] != MAGIC || blob[4] != VERSION {
        return Err(CoreError::Unlock);
    }
    if &blob[5..HEADER_LEN] != salt {
        return Err(CoreError::Unlock);
    }

    let nonce: [u8; NONCE_LEN] = blob[HEADER_LEN..HEADER_LEN + NONCE_LEN]
        .try_into()
        .map_err(|_| CoreError::Unlock)?;
    let ciphertext = &blob[HEADER_LEN + NONCE_LEN..];

    let key = derive_wrapping_key(password, salt)?;
    let cipher = XChaCha20Poly1305::new_from_slice(key.as_ref()).map_err(|_| CoreError::Unlock)?;
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(&nonce.into(), ciphertext)
            .map_err(|_| CoreError::Unlock)?,
    );

    let encoded: EncodedSecretKeys =
        serde_json::from_slice(&plaintext).map_err(|_| CoreError::Unlock)?;
    UserSecretKeys::from_encoded(&encoded).map_err(|_| CoreError::Unlock)
}

/// Extract the KDF salt from a blob header without decrypting it.
pub fn extract_salt(blob: &[u8]) -> CoreResult<[u8; SALT_LEN]> {
    if blob.len() < HEADER_LEN || &blob[0..4] != MAGIC {
        return Err(CoreError::Unlock);
    }
    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&blob[5..HEADER_LEN]);
    Ok(salt)
}

/// Derive the blob wrapping key from password and salt with Argon2id.
pub fn derive_wrapping_key(
    password: &str,
    salt: &[u8; SALT_LEN],
) -> CoreResult<Zeroizing<[u8; 32]>> {
    let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(32))
        .map_err(|e| CoreError::KeyDerivation(format!("invalid Argon2 parameters: {e:?}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let mut key = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(password.as_bytes(), salt, key.as_mut())
        .map_err(|e| CoreError::KeyDerivation(format!("Argon2 derivation failed: {e:?}")))?;
    Ok(key)
}

/// Hash a password for login verification (PHC string, random salt).
pub fn hash_login_password(password: &str) -> CoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CoreError::KeyDerivation(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a login password against a stored PHC string.
pub fn verify_login_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
