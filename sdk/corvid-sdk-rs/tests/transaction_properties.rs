//! Property tests for the transaction wire format.

use corvid_sdk::transaction::decode_and_verify;
use corvid_sdk::{Address, CryptoSuite, KeyPairSigner, UnsignedTransaction};
use corvid_types::RawTransaction;
use num_bigint::BigUint;
use proptest::prelude::*;

fn raw_transaction() -> impl Strategy<Value = RawTransaction> {
    (
        prop::collection::vec(any::<u8>(), 0..=31),
        any::<u64>(),
        any::<u64>(),
        any::<u64>(),
        prop::option::of(any::<[u8; 20]>()),
        any::<u128>(),
        prop::collection::vec(any::<u8>(), 0..80),
        any::<u64>(),
        any::<u64>(),
        prop::collection::vec(any::<u8>(), 0..16),
    )
        .prop_map(
            |(id, gas_price, gas_limit, block_limit, to, value, data, chain_id, group_id, extra)| {
                RawTransaction::new(
                    BigUint::from_bytes_be(&id),
                    BigUint::from(gas_price),
                    BigUint::from(gas_limit),
                    block_limit,
                    to.map(Address::from_bytes),
                    BigUint::from(value),
                    chain_id,
                    group_id,
                )
                .expect("random id below 250 bits")
                .with_data(data)
                .with_extra_data(extra)
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_unsigned_roundtrip(raw in raw_transaction()) {
        let tx = UnsignedTransaction::new(raw);
        let decoded = UnsignedTransaction::decode(&tx.encode()).unwrap();
        prop_assert_eq!(decoded, tx);
    }

    #[test]
    fn test_signed_recovers_sender(raw in raw_transaction(), ed25519 in any::<bool>()) {
        let suite = if ed25519 { CryptoSuite::ed25519() } else { CryptoSuite::ecdsa() };
        let signer = KeyPairSigner::new(suite, suite.generate_keypair()).unwrap();

        let signed = UnsignedTransaction::new(raw).hash(suite).sign(&signer).unwrap();
        let (decoded, sender) = decode_and_verify(suite, signed.encoded()).unwrap();

        prop_assert_eq!(sender, signer.address());
        prop_assert_eq!(decoded.tx_hash(), signed.tx_hash());
    }

    #[test]
    fn test_truncated_signed_rejected(raw in raw_transaction(), cut in 1usize..8) {
        let suite = CryptoSuite::ecdsa();
        let signer = KeyPairSigner::new(suite, suite.generate_keypair()).unwrap();
        let signed = UnsignedTransaction::new(raw).hash(suite).sign(&signer).unwrap();

        let bytes = signed.encoded();
        prop_assert!(decode_and_verify(suite, &bytes[..bytes.len() - cut]).is_err());
    }
}
