use alloy::primitives::{uint, U256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use serde::Serialize;
use sha3::{Digest, Keccak256};

/// secp256k1 group order `n`.
pub const SECP256K1_N: U256 =
    uint!(0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141_U256);

/// `n / 2`, the EIP-2 boundary between low-s and high-s form.
pub const SECP256K1_HALF_N: U256 =
    uint!(0x7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0_U256);

#[derive(Debug, Clone, thiserror::Error, Serialize)]
pub enum Secp256k1Error {
    #[error("Secp256k1 signature error: {0}")]
    InvalidSignature(String),
    #[error("Secp256k1 recovery mismatch: {0}")]
    RecoveryMismatch(String),
}

/// Normalizes a variable-length DER integer value-block to exactly 32 bytes.
///
/// Keeps the last 32 bytes (dropping any leading sign-byte padding) and left
/// pads shorter values with zeros. Idempotent on 32-byte input.
pub fn normalize_to_fixed_width(raw: &[u8]) -> [u8; 32] {
    let trimmed = if raw.len() > 32 {
        &raw[raw.len() - 32..]
    } else {
        raw
    };

    let mut out = [0u8; 32];
    out[32 - trimmed.len()..].copy_from_slice(trimmed);
    out
}

/// Maps `s` to its low-s form per EIP-2: `n - s` when `s > n/2`.
///
/// Both `(r, s)` and `(r, n - s)` verify for the same digest and key;
/// Ethereum consensus only accepts the low form.
pub fn canonicalize_s(s: U256) -> U256 {
    if s > SECP256K1_HALF_N {
        SECP256K1_N - s
    } else {
        s
    }
}

/// Finds the recovery id (0 or 1, tried in that fixed order) for which the
/// address recovered from `(digest, r, s)` equals `expected`.
///
/// The address comparison is on raw bytes, so casing of any textual form is
/// irrelevant. Fails with `RecoveryMismatch` when neither id matches, which
/// indicates a key mismatch or a corrupted signature and must be surfaced.
pub fn find_recovery_id(
    digest: &[u8; 32],
    r: &[u8; 32],
    s: &[u8; 32],
    expected: &[u8; 20],
) -> Result<u8, Secp256k1Error> {
    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(r);
    compact[32..].copy_from_slice(s);
    let sig = Signature::from_slice(&compact)
        .map_err(|e| Secp256k1Error::InvalidSignature(e.to_string()))?;

    for v in 0..2u8 {
        let rec_id = match RecoveryId::from_byte(v) {
            Some(id) => id,
            None => continue,
        };

        if let Ok(recovered_key) = VerifyingKey::recover_from_prehash(digest, &sig, rec_id) {
            let point = recovered_key.to_encoded_point(false);

            // Skip the 0x04 uncompressed point marker before hashing
            let hash = Keccak256::digest(&point.as_bytes()[1..]);
            if hash[12..] == expected[..] {
                return Ok(v);
            }
        }
    }

    Err(Secp256k1Error::RecoveryMismatch(format!(
        "no recovery ID reproduces address 0x{}; \
         this usually indicates a signature/key mismatch",
        hex::encode(expected)
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::{ecdsa::SigningKey, elliptic_curve::rand_core::OsRng};

    fn address_of(key: &SigningKey) -> [u8; 20] {
        let point = key.verifying_key().to_encoded_point(false);
        let hash = Keccak256::digest(&point.as_bytes()[1..]);
        let mut address = [0u8; 20];
        address.copy_from_slice(&hash[12..]);
        address
    }

    #[test]
    fn test_normalize_is_idempotent_on_fixed_width() {
        let input = [0xabu8; 32];
        assert_eq!(normalize_to_fixed_width(&input), input);
    }

    #[test]
    fn test_normalize_pads_short_input() {
        let out = normalize_to_fixed_width(&[0x01]);
        let mut expected = [0u8; 32];
        expected[31] = 0x01;
        assert_eq!(out, expected);
    }

    #[test]
    fn test_normalize_drops_der_sign_byte() {
        // 33 bytes: leading zero sign byte followed by a high-bit value
        let mut input = vec![0x00];
        input.extend_from_slice(&[0xff; 32]);
        assert_eq!(normalize_to_fixed_width(&input), [0xff; 32]);
    }

    #[test]
    fn test_normalize_exact_width_for_all_short_lengths() {
        for len in 1..=33 {
            let input = vec![0x7f; len];
            assert_eq!(normalize_to_fixed_width(&input).len(), 32);
        }
    }

    #[test]
    fn test_canonicalize_s_flips_high_values() {
        let high = SECP256K1_N - U256::from(1);
        assert_eq!(canonicalize_s(high), U256::from(1));
    }

    #[test]
    fn test_canonicalize_s_keeps_low_values() {
        assert_eq!(canonicalize_s(U256::from(7)), U256::from(7));
        assert_eq!(canonicalize_s(SECP256K1_HALF_N), SECP256K1_HALF_N);
    }

    #[test]
    fn test_canonicalize_s_is_idempotent() {
        let high = SECP256K1_N - U256::from(12345);
        assert_eq!(canonicalize_s(canonicalize_s(high)), canonicalize_s(high));
    }

    #[test]
    fn test_find_recovery_id_matches_signing() {
        let signing_key = SigningKey::random(&mut OsRng);
        let expected = address_of(&signing_key);
        let digest = [0x42u8; 32];

        let (signature, rec_id) = signing_key.sign_prehash_recoverable(&digest).unwrap();
        let r: [u8; 32] = signature.r().to_bytes().into();
        let s: [u8; 32] = signature.s().to_bytes().into();

        let v = find_recovery_id(&digest, &r, &s, &expected).unwrap();
        assert_eq!(v, rec_id.to_byte());
    }

    #[test]
    fn test_find_recovery_id_covers_both_ids() {
        // Sign varying digests until each recovery id has been exercised.
        let signing_key = SigningKey::random(&mut OsRng);
        let expected = address_of(&signing_key);
        let mut seen = [false; 2];

        for i in 0u8..64 {
            let digest: [u8; 32] = Keccak256::digest([i]).into();
            let (signature, rec_id) = signing_key.sign_prehash_recoverable(&digest).unwrap();
            let r: [u8; 32] = signature.r().to_bytes().into();
            let s: [u8; 32] = signature.s().to_bytes().into();

            let v = find_recovery_id(&digest, &r, &s, &expected).unwrap();
            assert_eq!(v, rec_id.to_byte());
            seen[v as usize] = true;
            if seen[0] && seen[1] {
                return;
            }
        }
        panic!("expected both recovery ids within 64 signatures");
    }

    #[test]
    fn test_find_recovery_id_mismatched_address() {
        let signing_key = SigningKey::random(&mut OsRng);
        let other_key = SigningKey::random(&mut OsRng);
        let digest = [0x42u8; 32];

        let (signature, _) = signing_key.sign_prehash_recoverable(&digest).unwrap();
        let r: [u8; 32] = signature.r().to_bytes().into();
        let s: [u8; 32] = signature.s().to_bytes().into();

        let result = find_recovery_id(&digest, &r, &s, &address_of(&other_key));
        assert!(matches!(result, Err(Secp256k1Error::RecoveryMismatch(_))));
    }
}
