//! Transaction building, hashing and signing.
//!
//! A transaction moves through three states, each its own type:
//!
//! ```text
//! UnsignedTransaction --hash--> HashedTransaction --sign--> SignedTransaction
//! ```
//!
//! Every state owns its [`RawTransaction`]; transitions consume the
//! previous state, so a signed transaction can never be re-hashed with
//! different fields.
//!
//! Wire layout is an RLP list in field order `random_id, gas_price,
//! gas_limit, block_limit, to, value, data, chain_id, group_id,
//! extra_data`. The signed form appends `v, r, s` (ECDSA) or
//! `signature, public_key` (Ed25519).

use crate::config::SdkConfig;
use crate::errors::{Result, SdkError};
use crate::signer::{self, RemoteSigner, TransactionSigner};
use corvid_codec::{CodecError, RlpItem};
use corvid_crypto::{CryptoSuite, CryptoSuiteKind};
use corvid_types::{
    Address, Ed25519PublicKey, Ed25519Signature, Hash, PublicKey, RawTransaction, SignatureResult,
};
use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::Arc;
use std::time::Duration;

const FIELD_COUNT: usize = 10;
const ECDSA_SIGNATURE_FIELDS: usize = 3;
const ED25519_SIGNATURE_FIELDS: usize = 2;

/// Draw a fresh random id with 250 bits of entropy.
pub fn random_id() -> BigUint {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    // keep the low two bits of the top byte: 2 + 31 * 8 = 250
    bytes[0] &= 0x03;
    BigUint::from_bytes_be(&bytes)
}

/// Caller supplied part of a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Recipient (None = contract creation)
    pub to: Option<Address>,
    /// Call data or init code
    pub data: Vec<u8>,
    /// Value to transfer
    pub value: BigUint,
    /// Overrides the configured gas price
    pub gas_price: Option<BigUint>,
    /// Overrides the configured gas limit
    pub gas_limit: Option<BigUint>,
    /// Opaque extra data
    pub extra_data: Vec<u8>,
}

impl TransactionRequest {
    /// Call an existing contract.
    pub fn call(to: Address, data: Vec<u8>) -> Self {
        Self {
            to: Some(to),
            data,
            ..Self::default()
        }
    }

    /// Deploy a contract.
    pub fn deploy(init_code: Vec<u8>) -> Self {
        Self {
            data: init_code,
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: BigUint) -> Self {
        self.value = value;
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: BigUint) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn with_gas_price(mut self, gas_price: BigUint) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn with_extra_data(mut self, extra_data: Vec<u8>) -> Self {
        self.extra_data = extra_data;
        self
    }
}

/// Fills in the chain-level fields of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBuilder {
    chain_id: u64,
    group_id: u64,
    block_limit_window: u64,
    gas_price: BigUint,
    gas_limit: BigUint,
}

impl TransactionBuilder {
    pub fn new(chain_id: u64, group_id: u64) -> Self {
        Self::from_config(&SdkConfig::default())
            .with_chain(chain_id, group_id)
    }

    pub fn from_config(config: &SdkConfig) -> Self {
        Self {
            chain_id: config.chain.chain_id,
            group_id: config.chain.group_id,
            block_limit_window: config.transaction.block_limit_window,
            gas_price: BigUint::from(config.transaction.gas_price),
            gas_limit: BigUint::from(config.transaction.gas_limit),
        }
    }

    pub fn with_chain(mut self, chain_id: u64, group_id: u64) -> Self {
        self.chain_id = chain_id;
        self.group_id = group_id;
        self
    }

    pub fn with_block_limit_window(mut self, window: u64) -> Self {
        self.block_limit_window = window;
        self
    }

    /// Build with a fresh random id.
    pub fn build(&self, request: TransactionRequest, current_block: u64) -> Result<UnsignedTransaction> {
        self.build_with_random_id(request, current_block, random_id())
    }

    /// Build with a caller chosen random id.
    pub fn build_with_random_id(
        &self,
        request: TransactionRequest,
        current_block: u64,
        random_id: BigUint,
    ) -> Result<UnsignedTransaction> {
        let block_limit = current_block
            .checked_add(self.block_limit_window)
            .ok_or_else(|| SdkError::InvalidTransaction("block limit overflows u64".into()))?;

        let tx = RawTransaction::new(
            random_id,
            request.gas_price.unwrap_or_else(|| self.gas_price.clone()),
            request.gas_limit.unwrap_or_else(|| self.gas_limit.clone()),
            block_limit,
            request.to,
            request.value,
            self.chain_id,
            self.group_id,
        )?
        .with_data(request.data)
        .with_extra_data(request.extra_data);

        Ok(UnsignedTransaction::new(tx))
    }
}

/// A transaction with every field set and no signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    tx: RawTransaction,
}

impl UnsignedTransaction {
    pub fn new(tx: RawTransaction) -> Self {
        Self { tx }
    }

    pub fn raw(&self) -> &RawTransaction {
        &self.tx
    }

    /// RLP encoding without signature.
    pub fn encode(&self) -> Vec<u8> {
        RlpItem::List(field_items(&self.tx)).encode()
    }

    /// Decode the unsigned encoding.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let item = RlpItem::decode(bytes)?;
        let items = item.as_list()?;
        if items.len() != FIELD_COUNT {
            return Err(malformed(format!(
                "unsigned transaction has {} fields, expected {}",
                items.len(),
                FIELD_COUNT
            )));
        }
        Ok(Self::new(parse_fields(items)?))
    }

    /// Hash the unsigned encoding with the suite's hash function.
    pub fn hash(self, suite: CryptoSuite) -> HashedTransaction {
        let hash = suite.hash(&self.encode());
        HashedTransaction {
            tx: self.tx,
            hash,
            suite,
        }
    }
}

/// A transaction together with the digest that gets signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedTransaction {
    tx: RawTransaction,
    hash: Hash,
    suite: CryptoSuite,
}

impl HashedTransaction {
    pub fn raw(&self) -> &RawTransaction {
        &self.tx
    }

    /// Digest of the unsigned encoding.
    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn suite(&self) -> CryptoSuite {
        self.suite
    }

    /// Sign with a local or synchronous remote signer.
    pub fn sign(self, signer: &dyn TransactionSigner) -> Result<SignedTransaction> {
        let signature = signer.sign(&self.hash)?;
        self.attach_signature(signature)
    }

    /// Sign by racing remote providers; the first success wins.
    pub async fn sign_remote(
        self,
        providers: &[Arc<dyn RemoteSigner>],
        timeout: Duration,
    ) -> Result<SignedTransaction> {
        let signature = signer::sign_first_of(providers, self.hash, timeout).await?;
        self.attach_signature(signature)
    }

    /// Attach a signature produced elsewhere. The signature is checked
    /// against the digest before it is accepted.
    pub fn attach_signature(self, signature: SignatureResult) -> Result<SignedTransaction> {
        self.suite.recover(&self.hash, &signature)?;
        Ok(SignedTransaction::assemble(self.tx, signature, self.suite))
    }
}

/// A signed transaction and its wire encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    inner: corvid_types::SignedTransaction,
    suite: CryptoSuite,
    encoded: Vec<u8>,
    tx_hash: Hash,
}

impl SignedTransaction {
    fn assemble(tx: RawTransaction, signature: SignatureResult, suite: CryptoSuite) -> Self {
        let mut items = field_items(&tx);
        items.extend(signature_items(&signature));
        let encoded = RlpItem::List(items).encode();
        let tx_hash = suite.hash(&encoded);
        Self {
            inner: corvid_types::SignedTransaction::new(tx, signature),
            suite,
            encoded,
            tx_hash,
        }
    }

    /// Decode a signed encoding. The signature is parsed but not checked;
    /// use [`SignedTransaction::recover_sender`] or
    /// [`decode_and_verify`] for that.
    pub fn decode(suite: CryptoSuite, bytes: &[u8]) -> Result<Self> {
        let item = RlpItem::decode(bytes)?;
        let items = item.as_list()?;
        let signature_fields = match suite.kind() {
            CryptoSuiteKind::Ecdsa => ECDSA_SIGNATURE_FIELDS,
            CryptoSuiteKind::Ed25519 => ED25519_SIGNATURE_FIELDS,
        };
        if items.len() != FIELD_COUNT + signature_fields {
            return Err(malformed(format!(
                "signed {} transaction has {} fields, expected {}",
                suite.kind(),
                items.len(),
                FIELD_COUNT + signature_fields
            )));
        }

        let (fields, signature) = items.split_at(FIELD_COUNT);
        let tx = parse_fields(fields)?;
        let signature = parse_signature(suite.kind(), signature)?;
        let decoded = Self::assemble(tx, signature, suite);
        // re-encoding must reproduce the input byte for byte
        if decoded.encoded != bytes {
            return Err(malformed("signed transaction is not canonically encoded"));
        }
        Ok(decoded)
    }

    pub fn raw(&self) -> &RawTransaction {
        &self.inner.tx
    }

    pub fn signature(&self) -> &SignatureResult {
        &self.inner.signature
    }

    /// Wire bytes of the signed transaction.
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    /// Transaction hash: suite hash of the signed encoding.
    pub fn tx_hash(&self) -> Hash {
        self.tx_hash
    }

    /// Digest the signature was made over.
    pub fn signing_hash(&self) -> Hash {
        self.suite.hash(&UnsignedTransaction::new(self.inner.tx.clone()).encode())
    }

    /// Recover the signer's public key and check the signature with it.
    pub fn recover_public_key(&self) -> Result<PublicKey> {
        Ok(self.suite.recover(&self.signing_hash(), &self.inner.signature)?)
    }

    pub fn recover_sender(&self) -> Result<Address> {
        let public_key = self.recover_public_key()?;
        Ok(self.suite.address_of(&public_key))
    }

    /// Verify against a known public key.
    pub fn verify(&self, public_key: &PublicKey) -> Result<()> {
        Ok(self
            .suite
            .verify(public_key, &self.signing_hash(), &self.inner.signature)?)
    }

    pub fn into_inner(self) -> corvid_types::SignedTransaction {
        self.inner
    }
}

/// Decode a signed transaction and recover its sender.
pub fn decode_and_verify(suite: CryptoSuite, bytes: &[u8]) -> Result<(SignedTransaction, Address)> {
    let tx = SignedTransaction::decode(suite, bytes)?;
    let sender = tx.recover_sender()?;
    Ok((tx, sender))
}

/// Builder plus suite: the whole unsigned-to-signed path in one call.
#[derive(Debug, Clone)]
pub struct TransactionPipeline {
    suite: CryptoSuite,
    builder: TransactionBuilder,
    signer_timeout: Duration,
}

impl TransactionPipeline {
    pub fn new(suite: CryptoSuite, builder: TransactionBuilder) -> Self {
        Self {
            suite,
            builder,
            signer_timeout: SdkConfig::default().signer_timeout(),
        }
    }

    pub fn from_config(config: &SdkConfig) -> Self {
        Self {
            suite: config.suite(),
            builder: TransactionBuilder::from_config(config),
            signer_timeout: config.signer_timeout(),
        }
    }

    pub fn suite(&self) -> CryptoSuite {
        self.suite
    }

    pub fn builder(&self) -> &TransactionBuilder {
        &self.builder
    }

    /// Build, hash and sign with a synchronous signer.
    pub fn build_and_sign(
        &self,
        request: TransactionRequest,
        current_block: u64,
        signer: &dyn TransactionSigner,
    ) -> Result<SignedTransaction> {
        let signed = self
            .builder
            .build(request, current_block)?
            .hash(self.suite)
            .sign(signer)?;
        tracing::debug!(tx_hash = %signed.tx_hash(), bytes = signed.encoded().len(), "Signed transaction");
        Ok(signed)
    }

    /// Build, hash and sign by racing remote signers.
    pub async fn build_and_sign_remote(
        &self,
        request: TransactionRequest,
        current_block: u64,
        providers: &[Arc<dyn RemoteSigner>],
    ) -> Result<SignedTransaction> {
        let hashed = self.builder.build(request, current_block)?.hash(self.suite);
        let signed = hashed.sign_remote(providers, self.signer_timeout).await?;
        tracing::debug!(tx_hash = %signed.tx_hash(), "Signed transaction remotely");
        Ok(signed)
    }
}

fn field_items(tx: &RawTransaction) -> Vec<RlpItem> {
    vec![
        RlpItem::uint(&tx.random_id),
        RlpItem::uint(&tx.gas_price),
        RlpItem::uint(&tx.gas_limit),
        RlpItem::u64(tx.block_limit),
        RlpItem::bytes(tx.to.map(|a| a.as_bytes().to_vec()).unwrap_or_default()),
        RlpItem::uint(&tx.value),
        RlpItem::bytes(tx.data.clone()),
        RlpItem::u64(tx.chain_id),
        RlpItem::u64(tx.group_id),
        RlpItem::bytes(tx.extra_data.clone()),
    ]
}

fn parse_fields(items: &[RlpItem]) -> Result<RawTransaction> {
    let to = match items[4].as_bytes()? {
        [] => None,
        bytes => Some(Address::from_slice(bytes)?),
    };
    let tx = RawTransaction::new(
        items[0].as_biguint()?,
        items[1].as_biguint()?,
        items[2].as_biguint()?,
        items[3].as_u64()?,
        to,
        items[5].as_biguint()?,
        items[7].as_u64()?,
        items[8].as_u64()?,
    )?
    .with_data(items[6].as_bytes()?.to_vec())
    .with_extra_data(items[9].as_bytes()?.to_vec());
    Ok(tx)
}

fn signature_items(signature: &SignatureResult) -> Vec<RlpItem> {
    match signature {
        SignatureResult::Ecdsa { v, r, s } => vec![
            RlpItem::u64(u64::from(*v)),
            RlpItem::uint(&BigUint::from_bytes_be(r)),
            RlpItem::uint(&BigUint::from_bytes_be(s)),
        ],
        SignatureResult::Ed25519 {
            signature,
            public_key,
        } => vec![
            RlpItem::bytes(signature.as_bytes().to_vec()),
            RlpItem::bytes(public_key.as_bytes().to_vec()),
        ],
    }
}

fn parse_signature(kind: CryptoSuiteKind, items: &[RlpItem]) -> Result<SignatureResult> {
    match kind {
        CryptoSuiteKind::Ecdsa => {
            let v = items[0].as_u64()?;
            let recovery_id = match v {
                27 | 28 => (v - 27) as u8,
                other => return Err(malformed(format!("invalid signature v value {}", other))),
            };
            Ok(SignatureResult::ecdsa(
                recovery_id,
                word(&items[1])?,
                word(&items[2])?,
            )?)
        }
        CryptoSuiteKind::Ed25519 => Ok(SignatureResult::Ed25519 {
            signature: Ed25519Signature::from_slice(items[0].as_bytes()?)?,
            public_key: Ed25519PublicKey::from_slice(items[1].as_bytes()?)?,
        }),
    }
}

/// A canonical RLP integer left-padded to 32 bytes.
fn word(item: &RlpItem) -> Result<[u8; 32]> {
    let bytes = item.as_biguint()?.to_bytes_be();
    if bytes.len() > 32 {
        return Err(malformed("signature component longer than 32 bytes"));
    }
    let mut out = [0u8; 32];
    // zero encodes as a single 0x00 from to_bytes_be
    if bytes != [0] {
        out[32 - bytes.len()..].copy_from_slice(&bytes);
    }
    Ok(out)
}

fn malformed(msg: impl Into<String>) -> SdkError {
    SdkError::Codec(CodecError::MalformedEncoding(msg.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::KeyPairSigner;
    use num_traits::One;

    fn request() -> TransactionRequest {
        TransactionRequest::call(Address::from_bytes([0x11; 20]), vec![0xa9, 0x05, 0x9c, 0xbb])
            .with_value(BigUint::from(5u8))
    }

    #[test]
    fn test_random_id_bits() {
        for _ in 0..32 {
            assert!(random_id().bits() <= 250);
        }
        assert_ne!(random_id(), random_id());
    }

    #[test]
    fn test_builder_fills_block_limit() {
        let builder = TransactionBuilder::new(5, 7);
        let unsigned = builder.build(request(), 1_000).unwrap();
        let tx = unsigned.raw();
        assert_eq!(tx.block_limit, 1_500);
        assert_eq!(tx.chain_id, 5);
        assert_eq!(tx.group_id, 7);
        assert_eq!(tx.gas_limit, BigUint::from(3_000_000u32));

        let custom = builder
            .with_block_limit_window(10)
            .build(request().with_gas_limit(BigUint::from(21_000u32)), 1)
            .unwrap();
        assert_eq!(custom.raw().block_limit, 11);
        assert_eq!(custom.raw().gas_limit, BigUint::from(21_000u32));
    }

    #[test]
    fn test_builder_rejects_overflow() {
        let result = TransactionBuilder::new(1, 1).build(request(), u64::MAX);
        assert!(matches!(result, Err(SdkError::InvalidTransaction(_))));
    }

    #[test]
    fn test_unsigned_encoding_field_order() {
        let unsigned = TransactionBuilder::new(1, 1)
            .build_with_random_id(TransactionRequest::deploy(vec![0x60]), 0, BigUint::one())
            .unwrap();
        let item = RlpItem::decode(&unsigned.encode()).unwrap();
        let items = item.as_list().unwrap();
        assert_eq!(items.len(), FIELD_COUNT);
        assert_eq!(items[0], RlpItem::u64(1));
        assert_eq!(items[3], RlpItem::u64(500));
        // contract creation leaves `to` empty
        assert_eq!(items[4], RlpItem::bytes(Vec::new()));
        assert_eq!(items[6], RlpItem::bytes(vec![0x60]));

        assert_eq!(UnsignedTransaction::decode(&unsigned.encode()).unwrap(), unsigned);
    }

    #[test]
    fn test_sign_and_decode_both_suites() {
        for suite in [CryptoSuite::ecdsa(), CryptoSuite::ed25519()] {
            let signer = KeyPairSigner::new(suite, suite.generate_keypair()).unwrap();
            let hashed = TransactionBuilder::new(1, 1).build(request(), 10).unwrap().hash(suite);
            let signing_hash = hashed.hash();
            let signed = hashed.sign(&signer).unwrap();

            assert_eq!(signed.signing_hash(), signing_hash);
            assert_eq!(signed.tx_hash(), suite.hash(signed.encoded()));

            let (decoded, sender) = decode_and_verify(suite, signed.encoded()).unwrap();
            assert_eq!(decoded, signed);
            assert_eq!(sender, signer.address());
            assert!(decoded.verify(&signer.public_key()).is_ok());
        }
    }

    #[test]
    fn test_signed_field_counts() {
        let suite = CryptoSuite::ecdsa();
        let signer = KeyPairSigner::new(suite, suite.generate_keypair()).unwrap();
        let signed = TransactionBuilder::new(1, 1)
            .build(request(), 0)
            .unwrap()
            .hash(suite)
            .sign(&signer)
            .unwrap();

        let item = RlpItem::decode(signed.encoded()).unwrap();
        assert_eq!(item.as_list().unwrap().len(), FIELD_COUNT + 3);

        // an ECDSA transaction does not parse under the Ed25519 suite
        assert!(matches!(
            SignedTransaction::decode(CryptoSuite::ed25519(), signed.encoded()),
            Err(SdkError::Codec(CodecError::MalformedEncoding(_)))
        ));
    }

    #[test]
    fn test_tampered_transaction_recovers_other_sender() {
        let suite = CryptoSuite::ecdsa();
        let signer = KeyPairSigner::new(suite, suite.generate_keypair()).unwrap();
        let signed = TransactionBuilder::new(1, 1)
            .build(request(), 0)
            .unwrap()
            .hash(suite)
            .sign(&signer)
            .unwrap();

        let mut items = RlpItem::decode(signed.encoded()).unwrap().as_list().unwrap().to_vec();
        items[5] = RlpItem::u64(1_000_000);
        let tampered = RlpItem::List(items).encode();

        match decode_and_verify(suite, &tampered) {
            Ok((_, sender)) => assert_ne!(sender, signer.address()),
            Err(err) => assert!(matches!(err, SdkError::Crypto(_))),
        }
    }

    #[test]
    fn test_attach_signature_checks_digest() {
        let suite = CryptoSuite::ed25519();
        let keypair = suite.generate_keypair();
        let wrong = suite.sign(&suite.hash(b"other"), &keypair).unwrap();
        let hashed = TransactionBuilder::new(1, 1).build(request(), 0).unwrap().hash(suite);
        assert!(matches!(hashed.attach_signature(wrong), Err(SdkError::Crypto(_))));
    }

    #[test]
    fn test_decode_rejects_bad_field_count() {
        let bytes = RlpItem::List(vec![RlpItem::u64(1); 4]).encode();
        assert!(UnsignedTransaction::decode(&bytes).is_err());
        assert!(SignedTransaction::decode(CryptoSuite::ecdsa(), &bytes).is_err());
    }

    #[test]
    fn test_signature_word_padding() {
        assert_eq!(word(&RlpItem::bytes(Vec::new())).unwrap(), [0u8; 32]);
        let mut expected = [0u8; 32];
        expected[31] = 7;
        assert_eq!(word(&RlpItem::u64(7)).unwrap(), expected);
        assert!(word(&RlpItem::bytes(vec![1u8; 33])).is_err());
    }
}
