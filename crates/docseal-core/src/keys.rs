//! Per-user key material.
//!
//! Each user carries one custody bundle: an X25519 keypair for payload-key
//! wrapping and an Ed25519 keypair for decision signatures. The bundle is
//! generated once at registration and never rotates.

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

pub use crypto_box::{PublicKey as EncryptionPublicKey, SecretKey as EncryptionSecretKey};

/// A user's public halves, safe to persist and hand out.
#[derive(Clone, Debug)]
pub struct UserPublicKeys {
    pub encryption: EncryptionPublicKey,
    pub signing: VerifyingKey,
}

/// A user's secret halves. Lives only inside the credential vault blob and,
/// after unlock, in session key custody.
#[derive(Clone)]
pub struct UserSecretKeys {
    pub encryption: EncryptionSecretKey,
    pub signing: SigningKey,
}

impl std::fmt::Debug for UserSecretKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSecretKeys")
            .field("encryption", &"<redacted>")
            .field("signing", &"<redacted>")
            .finish()
    }
}

/// Base58 wire form of the public halves, as stored on the user record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedPublicKeys {
    pub encryption: String,
    pub signing: String,
}

/// Base58 form of the secret halves; exists only as the vault blob plaintext.
#[derive(Serialize, Deserialize)]
pub(crate) struct EncodedSecretKeys {
    pub encryption: String,
    pub signing: String,
}

impl UserSecretKeys {
    pub fn generate() -> Self {
        Self {
            encryption: EncryptionSecretKey::generate(&mut OsRng),
            signing: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn public_keys(&self) -> UserPublicKeys {
        UserPublicKeys {
            encryption: self.encryption.public_key(),
            signing: self.signing.verifying_key(),
        }
    }

    pub(crate) fn to_encoded(&self) -> EncodedSecretKeys {
        EncodedSecretKeys {
            encryption: bs58::encode(self.encryption.to_bytes()).into_string(),
            signing: bs58::encode(self.signing.to_bytes()).into_string(),
        }
    }

    pub(crate) fn from_encoded(encoded: &EncodedSecretKeys) -> CoreResult<Self> {
        let encryption = decode_32(&encoded.encryption, "encryption secret key")?;
        let signing = decode_32(&encoded.signing, "signing secret key")?;
        Ok(Self {
            encryption: EncryptionSecretKey::from(encryption),
            signing: SigningKey::from_bytes(&signing),
        })
    }
}

impl UserPublicKeys {
    pub fn to_encoded(&self) -> EncodedPublicKeys {
        EncodedPublicKeys {
            encryption: bs58::encode(self.encryption.as_bytes()).into_string(),
            signing: bs58::encode(self.signing.as_bytes()).into_string(),
        }
    }

    pub fn from_encoded(encoded: &EncodedPublicKeys) -> CoreResult<Self> {
        let encryption = decode_32(&encoded.encryption, "encryption public key")?;
        let signing = decode_32(&encoded.signing, "signing public key")?;
        let signing = VerifyingKey::from_bytes(&signing)
            .map_err(|e| CoreError::InvalidKey(format!("signing public key: {e}")))?;
        Ok(Self {
            encryption: EncryptionPublicKey::from(encryption),
            signing,
        })
    }
}

fn decode_32(encoded: &str, what: &str) -> CoreResult<[u8; 32]> {
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|_| CoreError::InvalidKey(format!("invalid base58 in {what}")))?;
    bytes
        .try_into()
        .map_err(|_| CoreError::InvalidKey(format!("{what} must be 32 bytes")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_keys_roundtrip() {
        let secret = UserSecretKeys::generate();
        let public = secret.public_keys();

        let encoded = public.to_encoded();
        let recovered = UserPublicKeys::from_encoded(&encoded).unwrap();

        assert_eq!(public.encryption.as_bytes(), recovered.encryption.as_bytes());
        assert_eq!(public.signing.as_bytes(), recovered.signing.as_bytes());
    }

    #[test]
    fn test_secret_keys_roundtrip() {
        let secret = UserSecretKeys::generate();
        let recovered = UserSecretKeys::from_encoded(&secret.to_encoded()).unwrap();

        assert_eq!(
            secret.encryption.to_bytes(),
            recovered.encryption.to_bytes()
        );
        assert_eq!(secret.signing.to_bytes(), recovered.signing.to_bytes());
    }

    #[test]
    fn test_rejects_wrong_length_key() {
        let encoded = EncodedPublicKeys {
            encryption: bs58::encode([1u8; 16]).into_string(),
            signing: bs58::encode([2u8; 32]).into_string(),
        };
        assert!(UserPublicKeys::from_encoded(&encoded).is_err());
    }
}
