//! HTTP client for remote signing services.
//!
//! A signing service exposes one JSON-RPC method, `corvid_signHash`, taking
//! the hex digest and the suite name and returning the flat signature
//! bytes (`r || s || v` or `signature || public_key`) as hex.

use crate::errors::{Result, SdkError};
use crate::signer::RemoteSigner;
use async_trait::async_trait;
use corvid_crypto::CryptoSuite;
use corvid_types::{Hash, SignatureResult};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

const SIGN_METHOD: &str = "corvid_signHash";

/// RPC request.
#[derive(Debug, Serialize)]
struct RpcRequest {
    jsonrpc: &'static str,
    method: &'static str,
    params: serde_json::Value,
    id: u64,
}

/// RPC response.
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// RPC error.
#[derive(Debug, Deserialize)]
struct RpcError {
    code: i32,
    message: String,
}

/// Remote signer reached over HTTP JSON-RPC.
#[derive(Debug, Clone)]
pub struct HttpRemoteSigner {
    http: reqwest::Client,
    url: String,
    suite: CryptoSuite,
}

impl HttpRemoteSigner {
    /// Create a new signer client.
    pub fn new(url: impl Into<String>, suite: CryptoSuite) -> Self {
        Self::with_timeout(url, suite, Duration::from_secs(30))
    }

    /// Create a client whose HTTP requests give up after `timeout`.
    pub fn with_timeout(url: impl Into<String>, suite: CryptoSuite, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            http,
            url: url.into(),
            suite,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, params: serde_json::Value) -> Result<String> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method: SIGN_METHOD,
            params,
            id: 1,
        };

        let response_text = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .text()
            .await?;

        parse_response(&response_text)
    }
}

#[async_trait]
impl RemoteSigner for HttpRemoteSigner {
    fn name(&self) -> &str {
        &self.url
    }

    async fn sign(&self, hash: Hash) -> Result<SignatureResult> {
        let hex_signature = self
            .request(json!([hash.to_string(), self.suite.kind().to_string()]))
            .await?;
        let signature = parse_signature(&hex_signature)?;
        // never hand out a signature that does not match the digest
        self.suite.recover(&hash, &signature)?;
        Ok(signature)
    }
}

fn parse_response(text: &str) -> Result<String> {
    let response: RpcResponse<String> = serde_json::from_str(text)
        .map_err(|e| SdkError::Serialization(format!("Failed to parse response: {}", e)))?;

    if let Some(error) = response.error {
        return Err(SdkError::Rpc(format!("{}: {}", error.code, error.message)));
    }

    response
        .result
        .ok_or_else(|| SdkError::Rpc("Empty result".to_string()))
}

fn parse_signature(hex_signature: &str) -> Result<SignatureResult> {
    let bytes = hex::decode(hex_signature.trim().trim_start_matches("0x"))
        .map_err(|e| SdkError::Serialization(e.to_string()))?;
    Ok(SignatureResult::from_bytes(&bytes)?)
}
