//! Request and response shapes for the signing entry points.

use alloy::consensus::{TxEip1559, TxLegacy};
use serde::{Deserialize, Serialize};

/// EIP-191 personal message signing request.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignDataRequest {
    pub message: String,
}

/// EVM signature, hex-encoded at the boundary.
///
/// `sig` is the full 65-byte `r || s || v` payload; `r` and `s` are its
/// 32-byte halves and `v` is 27 or 28.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignDataResponse {
    pub sig: String,
    pub r: String,
    pub s: String,
    pub v: u8,
}

/// EIP-712 typed data signing request.
///
/// The caller supplies the already-hashed domain separator and struct hash
/// as 32-byte hex strings; the adapter assembles and hashes the
/// `\x19\x01`-prefixed message.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignTypedDataRequest {
    pub domain_separator: String,
    pub hash_struct_message: String,
}

/// Caller-populated unsigned transaction.
///
/// Population (nonce, fees, gas) is the caller's responsibility; the signer
/// only hashes, signs, and re-encodes.
#[derive(Debug, Clone)]
pub enum EvmTransactionRequest {
    Legacy(TxLegacy),
    Eip1559(TxEip1559),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvmTransactionDataSignature {
    pub r: String,
    pub s: String,
    pub v: u64,
}

impl From<&[u8; 65]> for EvmTransactionDataSignature {
    fn from(bytes: &[u8; 65]) -> Self {
        Self {
            r: hex::encode(&bytes[0..32]),
            s: hex::encode(&bytes[32..64]),
            v: bytes[64] as u64,
        }
    }
}

/// A signed, RLP-encoded transaction ready for broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignTransactionResponseEvm {
    pub hash: String,
    pub signature: EvmTransactionDataSignature,
    pub raw: Vec<u8>,
}
