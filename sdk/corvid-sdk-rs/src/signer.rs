//! Signing providers.
//!
//! Three shapes of signer are supported:
//! - [`TransactionSigner`]: synchronous, returns the signature directly
//! - [`RemoteSigner`]: asynchronous, several can be raced with
//!   [`sign_first_of`]
//! - [`CallbackSigner`]: hands the result to a [`SigningCompletion`] from a
//!   thread of its own choosing, driven by [`sign_with_callback`]
//!
//! Timeouts race the result channel against a `tokio` timer. Whichever
//! resolves first is the result; anything arriving later is dropped.

use crate::errors::{Result, SdkError};
use async_trait::async_trait;
use corvid_crypto::{CryptoSuite, KeyPair};
use corvid_types::{Address, Hash, PublicKey, SignatureResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Produces a signature over a transaction digest, synchronously.
pub trait TransactionSigner: Send + Sync {
    fn sign(&self, hash: &Hash) -> Result<SignatureResult>;
}

/// Produces a signature over a transaction digest, asynchronously.
#[async_trait]
pub trait RemoteSigner: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str {
        "remote"
    }

    async fn sign(&self, hash: Hash) -> Result<SignatureResult>;
}

/// Signs with a key pair held in memory.
#[derive(Clone, Debug)]
pub struct KeyPairSigner {
    suite: CryptoSuite,
    keypair: KeyPair,
}

impl KeyPairSigner {
    /// The key pair must belong to `suite`.
    pub fn new(suite: CryptoSuite, keypair: KeyPair) -> Result<Self> {
        if keypair.kind() != suite.kind() {
            return Err(SdkError::Crypto(corvid_crypto::CryptoError::SuiteMismatch {
                configured: suite.kind(),
                actual: keypair.kind(),
            }));
        }
        Ok(Self { suite, keypair })
    }

    /// Load from a hex encoded secret key.
    pub fn from_hex(suite: CryptoSuite, secret: &str) -> Result<Self> {
        let keypair = suite.keypair_from_hex(secret)?;
        Self::new(suite, keypair)
    }

    pub fn address(&self) -> Address {
        self.keypair.address()
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }
}

impl TransactionSigner for KeyPairSigner {
    fn sign(&self, hash: &Hash) -> Result<SignatureResult> {
        Ok(self.suite.sign(hash, &self.keypair)?)
    }
}

#[async_trait]
impl RemoteSigner for KeyPairSigner {
    fn name(&self) -> &str {
        "local"
    }

    async fn sign(&self, hash: Hash) -> Result<SignatureResult> {
        TransactionSigner::sign(self, &hash)
    }
}

/// Race `providers` for a signature over `hash`.
///
/// The first provider to succeed wins. Failures are only reported once
/// every provider has failed. Providers keep running after a winner is
/// found or the timeout fires; their results are dropped.
pub async fn sign_first_of(
    providers: &[Arc<dyn RemoteSigner>],
    hash: Hash,
    timeout: Duration,
) -> Result<SignatureResult> {
    if providers.is_empty() {
        return Err(SdkError::SigningFailed("no signing providers configured".into()));
    }

    let (tx, mut rx) = mpsc::channel(providers.len());
    for provider in providers {
        let provider = Arc::clone(provider);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = provider.sign(hash).await;
            if tx.send((provider.name().to_string(), result)).await.is_err() {
                tracing::debug!(provider = provider.name(), "Dropping late signing result");
            }
        });
    }
    drop(tx);

    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    let mut failures = Vec::new();
    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some((_, Ok(signature))) => return Ok(signature),
                Some((name, Err(err))) => {
                    tracing::warn!(provider = %name, error = %err, "Signing provider failed");
                    failures.push(format!("{}: {}", name, err));
                }
                None => return Err(SdkError::SigningFailed(failures.join("; "))),
            },
            _ = &mut deadline => {
                tracing::warn!(timeout = ?timeout, providers = providers.len(), "Signing timed out");
                return Err(SdkError::SigningTimeout(timeout));
            }
        }
    }
}

/// A signer that reports its result through a completion handle.
pub trait CallbackSigner: Send + Sync {
    /// Start signing and return immediately. The result is delivered with
    /// [`SigningCompletion::complete`], possibly from another thread.
    fn sign_async(&self, hash: Hash, completion: SigningCompletion);
}

/// One-shot completion handle shared by a signer and its timer.
///
/// Cloning is cheap. Only the first call to `complete` is delivered.
#[derive(Clone)]
pub struct SigningCompletion {
    sender: Arc<Mutex<Option<oneshot::Sender<Result<SignatureResult>>>>>,
}

impl SigningCompletion {
    fn new(sender: oneshot::Sender<Result<SignatureResult>>) -> Self {
        Self {
            sender: Arc::new(Mutex::new(Some(sender))),
        }
    }

    /// Deliver a result. Returns `false` if a result was already
    /// delivered or the wait has ended.
    pub fn complete(&self, result: Result<SignatureResult>) -> bool {
        let sender = self.sender.lock().take();
        match sender {
            Some(sender) => sender.send(result).is_ok(),
            None => {
                tracing::debug!(ok = result.is_ok(), "Dropping late signing result");
                false
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        self.sender.lock().is_none()
    }

    fn close(&self) {
        self.sender.lock().take();
    }
}

/// Run a callback signer and wait at most `timeout` for its result.
pub async fn sign_with_callback(
    signer: &dyn CallbackSigner,
    hash: Hash,
    timeout: Duration,
) -> Result<SignatureResult> {
    let (tx, rx) = oneshot::channel();
    let completion = SigningCompletion::new(tx);
    signer.sign_async(hash, completion.clone());

    tokio::select! {
        result = rx => result.unwrap_or_else(|_| {
            Err(SdkError::SigningFailed("signer dropped its completion handle".into()))
        }),
        _ = tokio::time::sleep(timeout) => {
            completion.close();
            tracing::warn!(timeout = ?timeout, "Callback signing timed out");
            Err(SdkError::SigningTimeout(timeout))
        }
    }
}
