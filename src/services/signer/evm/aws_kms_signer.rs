use alloy::{
    consensus::{SignableTransaction, TxEip1559, TxLegacy},
    eips::eip2718::Encodable2718,
    primitives::{utils::eip191_message, PrimitiveSignature},
};
use async_trait::async_trait;

use crate::{
    domain::{
        EvmTransactionDataSignature, EvmTransactionRequest, SignDataRequest, SignDataResponse,
        SignTransactionResponseEvm, SignTypedDataRequest,
    },
    models::{EvmAddress, SignerError},
    services::{
        signer::evm::{construct_eip712_message_hash, validate_and_format_signature},
        signer::Signer,
        AwsKmsClient, AwsKmsEvmService, AwsKmsK256, AwsKmsService,
    },
};

/// EVM signer backed by an AWS KMS key.
///
/// All entry points funnel a 32-byte digest into the KMS service, which
/// returns an address-verified recoverable signature.
pub struct AwsKmsSigner<T: AwsKmsK256 + Clone = AwsKmsClient> {
    aws_kms_service: AwsKmsService<T>,
}

impl<T: AwsKmsK256 + Clone> AwsKmsSigner<T> {
    pub fn new(aws_kms_service: AwsKmsService<T>) -> Self {
        Self { aws_kms_service }
    }

    fn checked_signature(signed_bytes: &[u8]) -> Result<PrimitiveSignature, SignerError> {
        if signed_bytes.len() != 65 {
            return Err(SignerError::SigningError(format!(
                "Invalid signature length from AWS KMS: expected 65 bytes, got {}",
                signed_bytes.len()
            )));
        }

        PrimitiveSignature::from_raw(signed_bytes)
            .map_err(|e| SignerError::ConversionError(e.to_string()))
    }
}

#[async_trait]
impl<T: AwsKmsK256 + Clone> Signer for AwsKmsSigner<T> {
    async fn address(&self) -> Result<EvmAddress, SignerError> {
        let address = self.aws_kms_service.get_evm_address().await?;
        Ok(address)
    }

    async fn sign_transaction(
        &self,
        transaction: EvmTransactionRequest,
    ) -> Result<SignTransactionResponseEvm, SignerError> {
        match transaction {
            EvmTransactionRequest::Eip1559(unsigned_tx) => {
                let payload = unsigned_tx.encoded_for_signing();
                let signed_bytes = self.aws_kms_service.sign_payload_evm(&payload).await?;

                let signature = Self::checked_signature(&signed_bytes)?;
                let mut signature_bytes = signature.as_bytes();
                let signed_tx = unsigned_tx.into_signed(signature);

                // Adjust v value for EIP-1559 (27/28 -> 0/1)
                if signature_bytes[64] == 27 {
                    signature_bytes[64] = 0;
                } else if signature_bytes[64] == 28 {
                    signature_bytes[64] = 1;
                }

                let mut raw = Vec::with_capacity(signed_tx.eip2718_encoded_length());
                signed_tx.eip2718_encode(&mut raw);

                Ok(SignTransactionResponseEvm {
                    hash: signed_tx.hash().to_string(),
                    signature: EvmTransactionDataSignature::from(&signature_bytes),
                    raw,
                })
            }
            EvmTransactionRequest::Legacy(unsigned_tx) => {
                let payload = unsigned_tx.encoded_for_signing();
                let signed_bytes = self.aws_kms_service.sign_payload_evm(&payload).await?;

                let signature = Self::checked_signature(&signed_bytes)?;
                let signature_bytes = signature.as_bytes();
                let signed_tx = unsigned_tx.into_signed(signature);

                let mut raw = Vec::with_capacity(signed_tx.rlp_encoded_length());
                signed_tx.rlp_encode(&mut raw);

                Ok(SignTransactionResponseEvm {
                    hash: signed_tx.hash().to_string(),
                    signature: EvmTransactionDataSignature::from(&signature_bytes),
                    raw,
                })
            }
        }
    }
}

#[async_trait]
impl<T: AwsKmsK256 + Clone> super::DataSignerTrait for AwsKmsSigner<T> {
    async fn sign_data(&self, request: SignDataRequest) -> Result<SignDataResponse, SignerError> {
        let message = eip191_message(request.message.as_bytes());

        let signature_bytes = self.aws_kms_service.sign_payload_evm(&message).await?;

        validate_and_format_signature(&signature_bytes, "AWS KMS")
    }

    async fn sign_typed_data(
        &self,
        request: SignTypedDataRequest,
    ) -> Result<SignDataResponse, SignerError> {
        let message_hash = construct_eip712_message_hash(&request)?;

        let signature_bytes = self.aws_kms_service.sign_hash_evm(&message_hash).await?;

        validate_and_format_signature(&signature_bytes, "AWS KMS")
    }
}
