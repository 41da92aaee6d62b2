//! Signer abstractions over KMS-backed key material.

pub mod evm;
pub use evm::*;

use async_trait::async_trait;

use crate::{
    domain::{EvmTransactionRequest, SignTransactionResponseEvm},
    models::{EvmAddress, SignerError},
};

#[async_trait]
pub trait Signer: Send + Sync {
    /// Returns the signer's Ethereum address
    async fn address(&self) -> Result<EvmAddress, SignerError>;

    /// Signs an Ethereum transaction
    async fn sign_transaction(
        &self,
        transaction: EvmTransactionRequest,
    ) -> Result<SignTransactionResponseEvm, SignerError>;
}
