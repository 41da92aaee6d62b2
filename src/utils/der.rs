//! Minimal DER field extraction for KMS payloads.
//!
//! AWS KMS returns ECDSA signatures as a DER SEQUENCE of two INTEGERs and
//! public keys as a SubjectPublicKeyInfo SEQUENCE whose second element is a
//! BIT STRING with the uncompressed SEC1 point. Only those shapes are
//! decoded here; this is not a general ASN.1 facility.

use simple_asn1::ASN1Block;

#[derive(Debug, Clone, thiserror::Error)]
pub enum DerError {
    #[error("malformed DER signature: {0}")]
    MalformedSignature(String),
    #[error("malformed DER public key: {0}")]
    MalformedPublicKey(String),
}

/// Extracts the two raw integer value-blocks of an ECDSA-Sig-Value.
///
/// The returned buffers are the DER content octets as-is: they may carry a
/// leading zero sign byte or be shorter than 32 bytes. Width normalization
/// is the bridge's job, see `normalize_to_fixed_width`.
pub fn extract_signature_fields(der: &[u8]) -> Result<(Vec<u8>, Vec<u8>), DerError> {
    let blocks = simple_asn1::from_der(der)
        .map_err(|e| DerError::MalformedSignature(format!("ASN.1 parse error: {e}")))?;

    let fields = match blocks.first() {
        Some(ASN1Block::Sequence(_, fields)) => fields,
        _ => {
            return Err(DerError::MalformedSignature(
                "expected a SEQUENCE of two INTEGERs".to_string(),
            ))
        }
    };

    match (fields.first(), fields.get(1)) {
        (Some(ASN1Block::Integer(_, r)), Some(ASN1Block::Integer(_, s))) => {
            Ok((r.to_signed_bytes_be(), s.to_signed_bytes_be()))
        }
        _ => Err(DerError::MalformedSignature(
            "signature SEQUENCE is missing its INTEGER fields".to_string(),
        )),
    }
}

/// Extracts the subjectPublicKey BIT STRING contents of a
/// SubjectPublicKeyInfo, format prefix byte included (`0x04 || x || y`).
pub fn extract_public_key_point(der: &[u8]) -> Result<Vec<u8>, DerError> {
    let blocks = simple_asn1::from_der(der)
        .map_err(|e| DerError::MalformedPublicKey(format!("ASN.1 parse error: {e}")))?;

    let fields = match blocks.first() {
        Some(ASN1Block::Sequence(_, fields)) => fields,
        _ => {
            return Err(DerError::MalformedPublicKey(
                "expected a SubjectPublicKeyInfo SEQUENCE".to_string(),
            ))
        }
    };

    match fields.get(1) {
        Some(ASN1Block::BitString(_, _, bytes)) => Ok(bytes.clone()),
        _ => Err(DerError::MalformedPublicKey(
            "subjectPublicKey BIT STRING not found".to_string(),
        )),
    }
}

/// Extracts the raw 64-byte `(x, y)` point from a DER-encoded secp256k1
/// public key, with the SEC1 format prefix stripped.
pub fn extract_public_key_from_der(der: &[u8]) -> Result<Vec<u8>, DerError> {
    let point = extract_public_key_point(der)?;

    if point.len() != 65 || point[0] != 0x04 {
        return Err(DerError::MalformedPublicKey(format!(
            "expected a 65-byte uncompressed point, got {} bytes",
            point.len()
        )));
    }

    Ok(point[1..].to_vec())
}
