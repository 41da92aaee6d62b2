//! # EVM Signer Implementations
//!
//! Signing entry points for EVM transactions and data, backed by AWS KMS.
//!
//! ## Features
//!
//! - **Transaction Signing**: Legacy and EIP-1559 transactions
//! - **Data Signing**: EIP-191 personal message signing
//! - **Typed Data**: EIP-712 structured data signing
//!
//! All signatures carry EIP-2 low-s malleability protection and an
//! address-verified recovery id.

mod aws_kms_signer;
pub use aws_kms_signer::*;
pub(crate) mod utils;

use async_trait::async_trait;

use crate::{
    domain::{SignDataRequest, SignDataResponse, SignTypedDataRequest},
    models::SignerError,
};

// EIP-712 and ECDSA Constants
const EIP712_PREFIX: [u8; 2] = [0x19, 0x01];
const EIP712_MESSAGE_SIZE: usize = 66; // 2 (prefix) + 32 (domain) + 32 (struct)

/// SECP256K1 signature length: 32 bytes (r) + 32 bytes (s) + 1 byte (v)
const SECP256K1_SIGNATURE_LENGTH: usize = 65;

/// Keccak256 hash output length
const HASH_LENGTH: usize = 32;

/// Validates and decodes a hex string with an optional `0x` prefix.
fn validate_and_decode_hex(value: &str, field_name: &str) -> Result<Vec<u8>, SignerError> {
    let hex_str = value.strip_prefix("0x").unwrap_or(value);

    if let Some((pos, ch)) = hex_str
        .chars()
        .enumerate()
        .find(|(_, c)| !c.is_ascii_hexdigit())
    {
        return Err(SignerError::SigningError(format!(
            "Invalid {} hex: non-hexadecimal character '{}' at position {}",
            field_name, ch, pos
        )));
    }

    hex::decode(hex_str).map_err(|e| {
        SignerError::SigningError(format!("Invalid {} hex: failed to decode - {}", field_name, e))
    })
}

/// Constructs the EIP-712 message hash
/// `keccak256("\x19\x01" ‖ domainSeparator ‖ hashStruct(message))`.
///
/// Both inputs must be 32-byte hex strings. The domain separator must be
/// unique to the dapp (name, version, chain id, verifying contract) and the
/// struct hash must uniquely identify the message; both are the caller's
/// responsibility.
pub fn construct_eip712_message_hash(
    request: &SignTypedDataRequest,
) -> Result<[u8; 32], SignerError> {
    let domain_separator = validate_and_decode_hex(&request.domain_separator, "domain separator")?;
    let hash_struct = validate_and_decode_hex(&request.hash_struct_message, "hash struct message")?;

    if domain_separator.len() != HASH_LENGTH {
        return Err(SignerError::SigningError(format!(
            "Invalid domain separator length: expected {} bytes, got {}",
            HASH_LENGTH,
            domain_separator.len()
        )));
    }
    if hash_struct.len() != HASH_LENGTH {
        return Err(SignerError::SigningError(format!(
            "Invalid hash struct length: expected {} bytes, got {}",
            HASH_LENGTH,
            hash_struct.len()
        )));
    }

    let mut eip712_message = [0u8; EIP712_MESSAGE_SIZE];
    eip712_message[0..2].copy_from_slice(&EIP712_PREFIX);
    eip712_message[2..34].copy_from_slice(&domain_separator);
    eip712_message[34..66].copy_from_slice(&hash_struct);

    let message_hash = alloy::primitives::keccak256(eip712_message);
    Ok(message_hash.into())
}

/// Validates signature length and formats it into a [`SignDataResponse`].
pub(crate) fn validate_and_format_signature(
    signature_bytes: &[u8],
    signer_name: &str,
) -> Result<SignDataResponse, SignerError> {
    if signature_bytes.len() != SECP256K1_SIGNATURE_LENGTH {
        return Err(SignerError::SigningError(format!(
            "Invalid signature length from {}: expected {} bytes, got {}",
            signer_name,
            SECP256K1_SIGNATURE_LENGTH,
            signature_bytes.len()
        )));
    }

    Ok(SignDataResponse {
        r: hex::encode(&signature_bytes[0..32]),
        s: hex::encode(&signature_bytes[32..64]),
        v: signature_bytes[64],
        sig: hex::encode(signature_bytes),
    })
}

#[async_trait]
pub trait DataSignerTrait: Send + Sync {
    /// Signs an EIP-191 personal message
    async fn sign_data(&self, request: SignDataRequest) -> Result<SignDataResponse, SignerError>;

    /// Signs EIP-712 typed data
    async fn sign_typed_data(
        &self,
        request: SignTypedDataRequest,
    ) -> Result<SignDataResponse, SignerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_eip712_message_hash() {
        let request = SignTypedDataRequest {
            domain_separator: "a".repeat(64),
            hash_struct_message: format!("0x{}", "b".repeat(64)),
        };

        let hash = construct_eip712_message_hash(&request).unwrap();

        let mut message = vec![0x19, 0x01];
        message.extend_from_slice(&[0xaa; 32]);
        message.extend_from_slice(&[0xbb; 32]);
        assert_eq!(hash, alloy::primitives::keccak256(&message).0);
    }

    #[test]
    fn test_construct_eip712_message_hash_rejects_bad_length() {
        let request = SignTypedDataRequest {
            domain_separator: "aa".to_string(),
            hash_struct_message: "b".repeat(64),
        };
        assert!(matches!(
            construct_eip712_message_hash(&request),
            Err(SignerError::SigningError(_))
        ));
    }

    #[test]
    fn test_construct_eip712_message_hash_rejects_bad_hex() {
        let request = SignTypedDataRequest {
            domain_separator: "z".repeat(64),
            hash_struct_message: "b".repeat(64),
        };
        assert!(matches!(
            construct_eip712_message_hash(&request),
            Err(SignerError::SigningError(_))
        ));
    }

    #[test]
    fn test_validate_and_format_signature() {
        let mut signature = [0x11u8; 65];
        signature[64] = 28;

        let response = validate_and_format_signature(&signature, "AWS KMS").unwrap();
        assert_eq!(response.r.len(), 64);
        assert_eq!(response.s.len(), 64);
        assert_eq!(response.v, 28);
        assert_eq!(response.sig.len(), 130);
    }

    #[test]
    fn test_validate_and_format_signature_rejects_wrong_length() {
        let result = validate_and_format_signature(&[0u8; 64], "AWS KMS");
        assert!(matches!(result, Err(SignerError::SigningError(_))));
    }
}
