//! # AWS KMS Service Module
//!
//! Integration with AWS KMS for secp256k1 signing where the private key
//! never leaves the service. KMS exposes only two primitives, signing a
//! 32-byte digest (returning a DER ECDSA signature) and returning the
//! DER-encoded public key, and this module bridges them into
//! Ethereum-usable form.
//!
//! ## Architecture
//!
//! ```text
//! AwsKmsService (implements AwsKmsEvmService)
//!   ├── EVM address derivation (memoized per service instance)
//!   └── Digest signing + recoverable-signature conversion
//! ```
//! is based on
//! ```text
//! AwsKmsClient (implements AwsKmsK256)
//!   ├── Authentication (via shared credentials)
//!   ├── Public Key Retrieval in DER encoding
//!   └── Digest Signing (ECDSA over secp256k1)
//! ```
//! `AwsKmsK256` is mocked with `mockall` for unit testing and injected
//! into `AwsKmsService`.

use alloy::primitives::keccak256;
use async_trait::async_trait;
use aws_config::{meta::region::RegionProviderChain, BehaviorVersion, Region};
use aws_sdk_kms::{
    primitives::Blob,
    types::{MessageType, SigningAlgorithmSpec},
    Client,
};
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::{
    models::{AwsKmsSignerConfig, EvmAddress},
    services::signer::evm::utils::{recover_evm_signature_from_der, SignatureBridgeError},
    utils::{self, derive_ethereum_address_from_der},
};

#[cfg(test)]
use mockall::{automock, mock};

#[derive(Clone, Debug, thiserror::Error, Serialize)]
pub enum AwsKmsError {
    #[error("AWS KMS response parse error: {0}")]
    ParseError(String),
    #[error("AWS KMS config error: {0}")]
    ConfigError(String),
    #[error("AWS KMS key retrieval error: {0}")]
    KeyRetrievalFailed(String),
    #[error("AWS KMS signing error: {0}")]
    SigningFailed(String),
    #[error("AWS KMS recovery error: {0}")]
    RecoveryError(#[from] utils::Secp256k1Error),
    #[error("AWS KMS Other error: {0}")]
    Other(String),
}

impl From<SignatureBridgeError> for AwsKmsError {
    fn from(e: SignatureBridgeError) -> Self {
        match e {
            SignatureBridgeError::Der(e) => AwsKmsError::ParseError(e.to_string()),
            SignatureBridgeError::Recovery(e) => AwsKmsError::RecoveryError(e),
        }
    }
}

pub type AwsKmsResult<T> = Result<T, AwsKmsError>;

#[async_trait]
#[cfg_attr(test, automock)]
pub trait AwsKmsEvmService: Send + Sync {
    /// Returns the EVM address derived from the configured public key.
    async fn get_evm_address(&self) -> AwsKmsResult<EvmAddress>;

    /// Signs a payload using the EVM signing scheme (hashes before signing).
    ///
    /// **Use for:**
    /// - Raw transaction data (TxLegacy, TxEip1559)
    /// - EIP-191 personal messages
    ///
    /// **Note:** For EIP-712 typed data, use `sign_hash_evm()` to avoid
    /// double-hashing.
    async fn sign_payload_evm(&self, payload: &[u8]) -> AwsKmsResult<Vec<u8>>;

    /// Signs a pre-computed 32-byte hash (no hashing applied).
    ///
    /// **Use for:**
    /// - EIP-712 typed data (already hashed)
    /// - Pre-computed message digests
    async fn sign_hash_evm(&self, hash: &[u8; 32]) -> AwsKmsResult<Vec<u8>>;
}

#[async_trait]
#[cfg_attr(test, automock)]
pub trait AwsKmsK256: Send + Sync {
    /// Fetches the DER-encoded public key from AWS KMS.
    async fn get_der_public_key<'a, 'b>(&'a self, key_id: &'b str) -> AwsKmsResult<Vec<u8>>;
    /// Signs a digest with the EcdsaSha256 algorithm. Returns a DER-encoded
    /// signature with no recovery information.
    async fn sign_digest<'a, 'b>(
        &'a self,
        key_id: &'b str,
        digest: [u8; 32],
    ) -> AwsKmsResult<Vec<u8>>;
}

#[cfg(test)]
mock! {
    pub AwsKmsClient { }
    impl Clone for AwsKmsClient {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl AwsKmsK256 for AwsKmsClient {
        async fn get_der_public_key<'a, 'b>(&'a self, key_id: &'b str) -> AwsKmsResult<Vec<u8>>;
        async fn sign_digest<'a, 'b>(
            &'a self,
            key_id: &'b str,
            digest: [u8; 32],
        ) -> AwsKmsResult<Vec<u8>>;
    }
}

#[derive(Debug, Clone)]
pub struct AwsKmsClient {
    inner: Client,
}

#[async_trait]
impl AwsKmsK256 for AwsKmsClient {
    async fn get_der_public_key<'a, 'b>(&'a self, key_id: &'b str) -> AwsKmsResult<Vec<u8>> {
        let get_output = self
            .inner
            .get_public_key()
            .key_id(key_id)
            .send()
            .await
            .map_err(|e| {
                AwsKmsError::KeyRetrievalFailed(format!(
                    "Failed to get secp256k1 public key for key '{key_id}': {e:?}"
                ))
            })?;

        let der_pk_blob = get_output
            .public_key
            .ok_or(AwsKmsError::KeyRetrievalFailed(
                "No public key blob found".to_string(),
            ))?
            .into_inner();

        Ok(der_pk_blob)
    }

    async fn sign_digest<'a, 'b>(
        &'a self,
        key_id: &'b str,
        digest: [u8; 32],
    ) -> AwsKmsResult<Vec<u8>> {
        debug!("Signing digest with AWS KMS, key_id: {}", key_id);

        let sign_result = self
            .inner
            .sign()
            .key_id(key_id)
            .signing_algorithm(SigningAlgorithmSpec::EcdsaSha256)
            .message_type(MessageType::Digest)
            .message(Blob::new(digest))
            .send()
            .await;

        let der_signature = sign_result
            .map_err(|e| AwsKmsError::SigningFailed(e.to_string()))?
            .signature
            .ok_or(AwsKmsError::SigningFailed(
                "Signature not found in response".to_string(),
            ))?
            .into_inner();

        Ok(der_signature)
    }
}

#[derive(Debug, Clone)]
pub struct AwsKmsService<T: AwsKmsK256 + Clone = AwsKmsClient> {
    pub kms_key_id: String,
    client: T,
    // The key behind an id never changes, so the derived address is
    // write-once-then-read. Concurrent first calls may both hit KMS and
    // compute the same value; no coordination beyond the cell is needed.
    address: OnceCell<[u8; 20]>,
}

impl AwsKmsService<AwsKmsClient> {
    pub async fn new(config: AwsKmsSignerConfig) -> AwsKmsResult<Self> {
        let region_provider =
            RegionProviderChain::first_try(config.region.map(Region::new)).or_default_provider();

        let auth_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;
        let client = AwsKmsClient {
            inner: Client::new(&auth_config),
        };

        Ok(Self {
            kms_key_id: config.key_id,
            client,
            address: OnceCell::new(),
        })
    }
}

#[cfg(test)]
impl<T: AwsKmsK256 + Clone> AwsKmsService<T> {
    pub fn new_for_testing(client: T, config: AwsKmsSignerConfig) -> Self {
        Self {
            client,
            kms_key_id: config.key_id,
            address: OnceCell::new(),
        }
    }
}

impl<T: AwsKmsK256 + Clone> AwsKmsService<T> {
    /// Returns the key's address, fetching and deriving it on first use.
    async fn evm_address_bytes(&self) -> AwsKmsResult<[u8; 20]> {
        self.address
            .get_or_try_init(|| async {
                let der = self.client.get_der_public_key(&self.kms_key_id).await?;
                derive_ethereum_address_from_der(&der)
                    .map_err(|e| AwsKmsError::ParseError(e.to_string()))
            })
            .await
            .map(|address| *address)
    }

    /// Signs `digest` with KMS and converts the DER result into a 65-byte
    /// recoverable signature verified against this key's own address.
    async fn sign_and_recover_evm(&self, digest: [u8; 32]) -> AwsKmsResult<Vec<u8>> {
        let expected_address = self.evm_address_bytes().await?;

        let der_signature = self.client.sign_digest(&self.kms_key_id, digest).await?;

        let signature = recover_evm_signature_from_der(&der_signature, &digest, &expected_address)?;
        Ok(signature.to_vec())
    }
}

#[async_trait]
impl<T: AwsKmsK256 + Clone> AwsKmsEvmService for AwsKmsService<T> {
    async fn get_evm_address(&self) -> AwsKmsResult<EvmAddress> {
        let address = self.evm_address_bytes().await?;
        Ok(EvmAddress(address))
    }

    async fn sign_payload_evm(&self, payload: &[u8]) -> AwsKmsResult<Vec<u8>> {
        let digest = keccak256(payload).0;
        self.sign_and_recover_evm(digest).await
    }

    async fn sign_hash_evm(&self, hash: &[u8; 32]) -> AwsKmsResult<Vec<u8>> {
        self.sign_and_recover_evm(*hash).await
    }
}
