use serde::{Deserialize, Serialize};

/// Configuration for an AWS KMS backed signer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AwsKmsSignerConfig {
    /// AWS region; falls back to the default provider chain when absent.
    pub region: Option<String>,
    /// KMS key ID or ARN of the secp256k1 signing key.
    pub key_id: String,
}
