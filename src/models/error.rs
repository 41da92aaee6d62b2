use serde::Serialize;

use crate::services::AwsKmsError;

/// Adapter-level error surfaced by the EVM signer entry points.
#[derive(Debug, Clone, thiserror::Error, Serialize)]
pub enum SignerError {
    #[error("Failed to sign: {0}")]
    SigningError(String),

    #[error("Conversion error: {0}")]
    ConversionError(String),

    #[error("AWS KMS error: {0}")]
    KmsError(#[from] AwsKmsError),
}
