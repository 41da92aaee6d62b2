//! Derivation of Ethereum addresses from DER-encoded public keys.

use super::der::extract_public_key_from_der;

#[derive(Debug, thiserror::Error)]
pub enum AddressDerivationError {
    #[error("Parse Error: {0}")]
    ParseError(String),
}

/// Derives the EVM address from a DER-encoded secp256k1 public key.
///
/// The address is the low-order 20 bytes of the keccak256 hash of the raw
/// 64-byte `(x, y)` point.
pub fn derive_ethereum_address_from_der(der: &[u8]) -> Result<[u8; 20], AddressDerivationError> {
    let pub_key = extract_public_key_from_der(der)
        .map_err(|e| AddressDerivationError::ParseError(e.to_string()))?;

    let hash = alloy::primitives::keccak256(pub_key);

    // Take the last 20 bytes of the hash
    let address_bytes = &hash[hash.len() - 20..];

    let mut array = [0u8; 20];
    array.copy_from_slice(address_bytes);

    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;

    // secp256k1 SubjectPublicKeyInfo with a known address
    const VALID_SECP256K1_DER: &str = "3056301006072a8648ce3d020106052b8104000a034200048c9689879c1f670be3f1bddb4381988a4a834cb5d6523321905b3d9468f637d075ef3a37ee9e0f4b2f7dac38a8d101cb69da6ca34aed4c90d2212456f4c74ea8";

    #[test]
    fn test_derive_ethereum_address_from_der_with_valid_secp256k1() {
        let der = hex::decode(VALID_SECP256K1_DER).unwrap();
        let result = derive_ethereum_address_from_der(&der);
        assert!(result.is_ok());

        let address = result.unwrap();
        assert_eq!(
            format!("0x{}", hex::encode(address)),
            "0xeeb8861f51b3f3f2204d64bbf7a7eb25e1b4d6cd"
        );
    }

    #[test]
    fn test_derive_ethereum_address_from_der_is_deterministic() {
        let der = hex::decode(VALID_SECP256K1_DER).unwrap();
        let first = derive_ethereum_address_from_der(&der).unwrap();
        let second = derive_ethereum_address_from_der(&der).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_derive_ethereum_address_from_der_with_invalid_data() {
        let invalid_der = &[1, 2, 3];
        let result = derive_ethereum_address_from_der(invalid_der);
        assert!(result.is_err());
        assert!(matches!(result, Err(AddressDerivationError::ParseError(_))));
    }
}
