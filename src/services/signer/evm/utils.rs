//! DER-to-recoverable signature bridge for EVM KMS signers.
//!
//! KMS services return plain DER ECDSA signatures with no recovery
//! information. This module turns them into the 65-byte `r || s || v`
//! form Ethereum expects: fixed-width components, EIP-2 low-s form, and a
//! recovery id verified against the key's known address.

use alloy::primitives::U256;

use crate::utils::{
    canonicalize_s, extract_signature_fields, find_recovery_id, normalize_to_fixed_width,
    DerError, Secp256k1Error,
};

#[derive(Debug, thiserror::Error)]
pub enum SignatureBridgeError {
    #[error(transparent)]
    Der(#[from] DerError),
    #[error(transparent)]
    Recovery(#[from] Secp256k1Error),
}

/// Converts a DER ECDSA signature over `digest` into a 65-byte recoverable
/// signature whose recovered address equals `expected_address`.
///
/// The recovery id candidates are tried in fixed order, 27 before 28. When
/// neither reproduces the expected address the conversion fails rather than
/// returning a wrongly-attributed signature.
pub fn recover_evm_signature_from_der(
    der_signature: &[u8],
    digest: &[u8; 32],
    expected_address: &[u8; 20],
) -> Result<[u8; 65], SignatureBridgeError> {
    let (raw_r, raw_s) = extract_signature_fields(der_signature)?;
    let r = normalize_to_fixed_width(&raw_r);
    let mut s = normalize_to_fixed_width(&raw_s);

    // Low-s normalization happens before the recovery-id search, so the
    // search is always against the form that will be emitted.
    s = canonicalize_s(U256::from_be_bytes(s)).to_be_bytes();

    let v = find_recovery_id(digest, &r, &s, expected_address)?;

    let mut signature = [0u8; 65];
    signature[..32].copy_from_slice(&r);
    signature[32..64].copy_from_slice(&s);
    signature[64] = 27 + v;
    Ok(signature)
}
