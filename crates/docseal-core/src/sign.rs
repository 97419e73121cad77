//! Decision signatures.
//!
//! The canonical payload is a deterministic, length-framed serialization of
//! exactly the attested fields. Verification rebuilds the same bytes from the
//! stored record; any divergence in any field yields `false`, never an error.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

/// Canonical bytes for a decision: object id, outcome tag, decision text,
/// timestamp. Each variable-length field is length-prefixed so the encoding
/// is unambiguous.
pub fn decision_payload(object_id: &str, outcome: &str, text: &str, signed_at: u64) -> Vec<u8> {
    let mut payload = Vec::new();
    for field in [object_id.as_bytes(), outcome.as_bytes(), text.as_bytes()] {
        payload.extend((field.len() as u64).to_le_bytes());
        payload.extend_from_slice(field);
    }
    payload.extend(signed_at.to_le_bytes());
    payload
}

pub fn sign_decision(key: &SigningKey, payload: &[u8]) -> Signature {
    key.sign(payload)
}

/// Reportable, non-fatal verification: `false` on any mismatch.
pub fn verify_decision(key: &VerifyingKey, payload: &[u8], signature: &Signature) -> bool {
    key.verify(payload, signature).is_ok()
}
