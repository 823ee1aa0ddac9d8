use crate::address::Address;
use crate::error::TypesError;
use crate::signature::SignatureResult;
use num_bigint::BigUint;
use std::fmt;

/// Entropy carried by the random id of every transaction.
pub const RANDOM_ID_BITS: u64 = 250;

/// Unsigned transaction data, in the field order used on the wire.
///
/// A `RawTransaction` is assembled right before signing and consumed by
/// value by the transaction pipeline; nothing mutates it afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RawTransaction {
    /// Random id, replaces an account nonce for replay protection
    pub random_id: BigUint,
    /// Gas price
    pub gas_price: BigUint,
    /// Maximum gas units this TX can consume
    pub gas_limit: BigUint,
    /// Last block height at which the TX may be included
    pub block_limit: u64,
    /// Recipient address (None = contract creation)
    pub to: Option<Address>,
    /// Value to transfer
    pub value: BigUint,
    /// Input data (contract call data or init code)
    pub data: Vec<u8>,
    /// Chain ID (replay protection across chains)
    pub chain_id: u64,
    /// Group ID (replay protection across groups of one chain)
    pub group_id: u64,
    /// Opaque extra data
    pub extra_data: Vec<u8>,
}

impl RawTransaction {
    /// Create a new transaction
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        random_id: BigUint,
        gas_price: BigUint,
        gas_limit: BigUint,
        block_limit: u64,
        to: Option<Address>,
        value: BigUint,
        chain_id: u64,
        group_id: u64,
    ) -> Result<Self, TypesError> {
        if random_id.bits() > RANDOM_ID_BITS {
            return Err(TypesError::RandomIdTooLarge {
                max_bits: RANDOM_ID_BITS,
            });
        }
        Ok(Self {
            random_id,
            gas_price,
            gas_limit,
            block_limit,
            to,
            value,
            data: Vec::new(),
            chain_id,
            group_id,
            extra_data: Vec::new(),
        })
    }

    /// Check if this is a contract creation transaction
    pub fn is_create(&self) -> bool {
        self.to.is_none()
    }

    /// Add data to the transaction
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Add extra data to the transaction
    pub fn with_extra_data(mut self, extra_data: Vec<u8>) -> Self {
        self.extra_data = extra_data;
        self
    }
}

/// Transaction with signature attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    pub tx: RawTransaction,
    pub signature: SignatureResult,
}

impl SignedTransaction {
    /// Create a new signed transaction
    pub fn new(tx: RawTransaction, signature: SignatureResult) -> Self {
        Self { tx, signature }
    }

    /// Check if this is a contract creation
    pub fn is_create(&self) -> bool {
        self.tx.is_create()
    }
}

impl fmt::Display for RawTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let to = self
            .to
            .map(|a| a.to_string())
            .unwrap_or_else(|| "<create>".to_string());
        write!(
            f,
            "RawTransaction {{ chain_id: {}, group_id: {}, block_limit: {}, to: {}, value: {}, data: {} bytes }}",
            self.chain_id,
            self.group_id,
            self.block_limit,
            to,
            self.value,
            self.data.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(to: Option<Address>) -> RawTransaction {
        RawTransaction::new(
            BigUint::from(42u32),
            BigUint::from(1u32),
            BigUint::from(3_000_000u32),
            600,
            to,
            BigUint::from(0u32),
            1,
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_transaction_new() {
        let tx = sample(Some(Address::ZERO)).with_data(vec![1, 2, 3]);
        assert_eq!(tx.chain_id, 1);
        assert_eq!(tx.block_limit, 600);
        assert_eq!(tx.data, vec![1, 2, 3]);
        assert!(!tx.is_create());
    }

    #[test]
    fn test_transaction_create() {
        assert!(sample(None).is_create());
        assert!(sample(None).to_string().contains("<create>"));
    }

    #[test]
    fn test_random_id_bound() {
        let too_big = BigUint::from(1u8) << 250;
        let result = RawTransaction::new(
            too_big,
            BigUint::default(),
            BigUint::default(),
            0,
            None,
            BigUint::default(),
            1,
            1,
        );
        assert_eq!(result, Err(TypesError::RandomIdTooLarge { max_bits: 250 }));

        let max = (BigUint::from(1u8) << 250) - 1u8;
        assert!(RawTransaction::new(
            max,
            BigUint::default(),
            BigUint::default(),
            0,
            None,
            BigUint::default(),
            1,
            1,
        )
        .is_ok());
    }

    #[test]
    fn test_signed_transaction() {
        let sig = SignatureResult::ecdsa(0, [1u8; 32], [2u8; 32]).unwrap();
        let signed = SignedTransaction::new(sample(None), sig);
        assert!(signed.is_create());
        assert_eq!(signed.signature, sig);
    }
}
