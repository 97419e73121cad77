//! Property-based tests for the hybrid encryption engine.
//!
//! These validate SEMANTIC correctness, not byte-level equality; ciphertexts
//! are non-deterministic on every seal.

#[cfg(feature = "proptest")]
mod proptest_suite {
    use std::collections::BTreeMap;

    use docseal_core::keys::UserSecretKeys;
    use docseal_core::{hybrid, CoreError};
    use proptest::prelude::*;

    proptest! {
        /// Property: open_as(seal_for(p, r), x, key(x)) == p for every x in r.
        #[test]
        fn prop_seal_open_roundtrip(data in prop::collection::vec(any::<u8>(), 1..1000)) {
            let alice = UserSecretKeys::generate();
            let bob = UserSecretKeys::generate();

            let mut recipients = BTreeMap::new();
            recipients.insert("alice".to_string(), alice.public_keys().encryption);
            recipients.insert("bob".to_string(), bob.public_keys().encryption);

            let payload = hybrid::seal_for(&data, &recipients).unwrap();

            prop_assert_eq!(hybrid::open_as(&payload, "alice", &alice).unwrap(), data.clone());
            prop_assert_eq!(hybrid::open_as(&payload, "bob", &bob).unwrap(), data);
        }

        /// Property: an identity outside the recipient set never gets plaintext.
        #[test]
        fn prop_confidentiality_boundary(data in prop::collection::vec(any::<u8>(), 1..500)) {
            let alice = UserSecretKeys::generate();
            let outsider = UserSecretKeys::generate();

            let mut recipients = BTreeMap::new();
            recipients.insert("alice".to_string(), alice.public_keys().encryption);

            let payload = hybrid::seal_for(&data, &recipients).unwrap();
            let err = hybrid::open_as(&payload, "outsider", &outsider).unwrap_err();

            prop_assert!(matches!(err, CoreError::NotARecipient));
        }

        /// Property: flipping any single ciphertext bit fails integrity for a
        /// legitimate recipient.
        #[test]
        fn prop_tamper_detection(
            data in prop::collection::vec(any::<u8>(), 1..200),
            byte_index in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let alice = UserSecretKeys::generate();

            let mut recipients = BTreeMap::new();
            recipients.insert("alice".to_string(), alice.public_keys().encryption);

            let mut payload = hybrid::seal_for(&data, &recipients).unwrap();
            let index = byte_index.index(payload.ciphertext.len());
            payload.ciphertext[index] ^= 1 << bit;

            let err = hybrid::open_as(&payload, "alice", &alice).unwrap_err();
            prop_assert!(matches!(err, CoreError::Integrity));
        }
    }
}
