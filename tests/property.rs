use proptest::prelude::*;
use wallet_adapter_core::codec::{base58, compact};
use wallet_adapter_core::keystore::{self, KeyStore, MemoryKeyStore};

proptest! {
    #[test]
    fn base58_roundtrips(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let encoded = base58::encode(&bytes);
        let decoded = base58::decode(&encoded).unwrap();
        prop_assert_eq!(decoded, bytes);
    }

    #[test]
    fn base58_matches_reference_encoder(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let encoded = base58::encode(&bytes);
        let reference = bs58::encode(&bytes).into_string();
        prop_assert_eq!(encoded, reference);
    }

    #[test]
    fn base58_decodes_reference_output(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let reference = bs58::encode(&bytes).into_string();
        let decoded = base58::decode(&reference).unwrap();
        prop_assert_eq!(decoded, bytes);
    }

    #[test]
    fn compact_u16_roundtrips(value in any::<u16>()) {
        let mut buf = Vec::new();
        compact::write_compact_u16(value, &mut buf);
        prop_assert!(buf.len() <= 3);

        let (decoded, consumed) = compact::read_compact_u16(&buf).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(consumed, buf.len());
    }

    #[test]
    fn compact_u16_width_is_canonical(value in any::<u16>()) {
        let mut buf = Vec::new();
        compact::write_compact_u16(value, &mut buf);
        let expected = match value {
            0..=0x7f => 1,
            0x80..=0x3fff => 2,
            _ => 3,
        };
        prop_assert_eq!(buf.len(), expected);
    }

    #[test]
    fn signatures_verify_for_the_signing_key(
        seed in prop::array::uniform32(any::<u8>()),
        message in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let store = MemoryKeyStore::from_seed(seed);
        let public_key = store.public_key().unwrap();
        let signature = store.sign(&message).unwrap();
        prop_assert!(keystore::verify(&signature, &message, public_key.as_bytes()).unwrap());
    }

    #[test]
    fn tampered_messages_fail_verification(
        seed in prop::array::uniform32(any::<u8>()),
        message in prop::collection::vec(any::<u8>(), 1..256),
        flip in any::<u8>(),
    ) {
        let store = MemoryKeyStore::from_seed(seed);
        let public_key = store.public_key().unwrap();
        let signature = store.sign(&message).unwrap();

        let mut tampered = message.clone();
        tampered[0] ^= flip | 1;
        prop_assert!(!keystore::verify(&signature, &tampered, public_key.as_bytes()).unwrap());
    }
}
