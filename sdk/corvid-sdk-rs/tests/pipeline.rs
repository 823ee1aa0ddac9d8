//! End-to-end: config, contract call, signing, decoding and receipts.

use corvid_sdk::transaction::decode_and_verify;
use corvid_sdk::{
    Address, AbiValue, Contract, ContractError, CryptoSuite, Hash, KeyPairSigner, RemoteSigner,
    SdkConfig, SdkError, SignedTransaction, TransactionPipeline, TransactionReceipt,
};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

const TOKEN_ABI: &str = r#"[
    {"type":"function","name":"transfer","inputs":[
        {"name":"to","type":"address"},{"name":"amount","type":"uint256"}],
        "outputs":[{"name":"","type":"bool"}]},
    {"type":"event","name":"Transfer","inputs":[
        {"indexed":true,"name":"from","type":"address"},
        {"indexed":true,"name":"to","type":"address"},
        {"indexed":false,"name":"value","type":"uint256"}]}
]"#;

fn config_file(suite: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[chain]\nsuite = \"{}\"\nchain_id = 9\ngroup_id = 2\n\n[transaction]\nblock_limit_window = 50\n",
        suite
    )
    .unwrap();
    file
}

#[test]
fn test_build_sign_decode_from_config() {
    for suite_name in ["ecdsa", "ed25519"] {
        let file = config_file(suite_name);
        let config = SdkConfig::from_file(file.path()).unwrap();
        let suite = config.suite();
        let signer = KeyPairSigner::new(suite, suite.generate_keypair()).unwrap();

        let token = Contract::from_json(suite, TOKEN_ABI)
            .unwrap()
            .at(Address::from_bytes([0x42; 20]));
        let request = token
            .call_request(
                "transfer",
                &[AbiValue::Address(Address::from_bytes([0x01; 20])), AbiValue::uint256(10u8)],
            )
            .unwrap();

        let signed = TransactionPipeline::from_config(&config)
            .build_and_sign(request.clone(), 100, &signer)
            .unwrap();
        assert_eq!(signed.raw().block_limit, 150);
        assert_eq!(signed.raw().chain_id, 9);
        assert_eq!(signed.raw().group_id, 2);
        assert_eq!(signed.raw().data, request.data);

        let (decoded, sender) = decode_and_verify(suite, signed.encoded()).unwrap();
        assert_eq!(sender, signer.address());
        assert_eq!(decoded.tx_hash(), signed.tx_hash());
    }
}

#[tokio::test]
async fn test_remote_pipeline_race() {
    let config = SdkConfig::default();
    let suite = config.suite();
    let signer = KeyPairSigner::new(suite, suite.generate_keypair()).unwrap();
    let providers: Vec<Arc<dyn RemoteSigner>> = vec![Arc::new(signer.clone())];

    let signed = TransactionPipeline::from_config(&config)
        .build_and_sign_remote(
            corvid_sdk::TransactionRequest::deploy(vec![0x60, 0x00]),
            0,
            &providers,
        )
        .await
        .unwrap();
    assert!(signed.raw().is_create());
    assert_eq!(signed.recover_sender().unwrap(), signer.address());

    let reparsed = SignedTransaction::decode(suite, signed.encoded()).unwrap();
    assert_eq!(reparsed, signed);
}

#[tokio::test]
async fn test_remote_pipeline_without_providers() {
    let result = TransactionPipeline::from_config(&SdkConfig::default())
        .builder()
        .build(corvid_sdk::TransactionRequest::default(), 0)
        .unwrap()
        .hash(CryptoSuite::ecdsa())
        .sign_remote(&[], Duration::from_millis(50))
        .await;
    assert!(matches!(result, Err(SdkError::SigningFailed(_))));
}

#[test]
fn test_receipt_with_events() {
    let suite = CryptoSuite::ecdsa();
    let token = Contract::from_json(suite, TOKEN_ABI).unwrap();

    let transfer = token.abi().event("Transfer").unwrap();
    let mut from = [0u8; 32];
    from[31] = 1;
    let mut to = [0u8; 32];
    to[31] = 2;

    let mut receipt = TransactionReceipt::new(
        Hash::from_bytes([7u8; 32]),
        0,
        format!("0x{}", hex::encode(corvid_sdk::codec::abi::encode(&[AbiValue::Bool(true)]).unwrap())),
    );
    receipt.add_log(corvid_types::Log::new(
        Address::from_bytes([0x42; 20]),
        vec![
            token.event_decoder().topic(transfer),
            Hash::from_bytes(from),
            Hash::from_bytes(to),
        ],
        corvid_sdk::codec::abi::encode(&[AbiValue::uint256(10u8)]).unwrap(),
    ));

    let result = token
        .receipt_parser()
        .parse_with(&receipt, |output| token.decode_output("transfer", output))
        .unwrap();
    assert_eq!(result, Some(vec![AbiValue::Bool(true)]));

    let events = token.event_decoder().decode_all(&receipt.logs).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].param("value"), Some(&AbiValue::uint256(10u8)));
}

#[test]
fn test_failed_receipt_raises_contract_error() {
    let suite = CryptoSuite::ecdsa();
    let output = corvid_sdk::AbiCodec::new(suite).encode_revert("not owner").unwrap();
    let receipt = TransactionReceipt::new(Hash::ZERO, 22, format!("0x{}", hex::encode(output)));

    let token = Contract::from_json(suite, TOKEN_ABI).unwrap();
    let result = token
        .receipt_parser()
        .parse_with(&receipt, |_| -> corvid_sdk::Result<()> { unreachable!() });
    match result {
        Err(SdkError::Contract(ContractError { code, message })) => {
            assert_eq!(code, 22);
            assert_eq!(message, "not owner");
        }
        other => panic!("unexpected: {:?}", other),
    }
}
