//! # evm-kms-signer
//!
//! Ethereum signing with a private key that never leaves AWS KMS.
//!
//! KMS exposes only "sign this digest" (returning a DER ECDSA signature
//! with no recovery information) and "return the public key" (DER). This
//! crate bridges that gap: it extracts `(r, s)` from the DER payload,
//! normalizes the components to fixed width, enforces the EIP-2 low-s
//! canonical form, finds the recovery id by verifying candidates against
//! the key's derived address, and assembles the 65-byte `r || s || v`
//! signature Ethereum expects.
//!
//! ## Example
//!
//! ```no_run
//! use evm_kms_signer::models::AwsKmsSignerConfig;
//! use evm_kms_signer::services::{AwsKmsService, AwsKmsSigner, DataSignerTrait, Signer};
//! use evm_kms_signer::domain::SignDataRequest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = AwsKmsService::new(AwsKmsSignerConfig {
//!     region: Some("us-east-1".to_string()),
//!     key_id: "arn:aws:kms:...".to_string(),
//! })
//! .await?;
//! let signer = AwsKmsSigner::new(service);
//!
//! let address = signer.address().await?;
//! let signature = signer
//!     .sign_data(SignDataRequest {
//!         message: "Hello World".to_string(),
//!     })
//!     .await?;
//! println!("{address}: 0x{}", signature.sig);
//! # Ok(())
//! # }
//! ```

pub mod domain;
pub mod models;
pub mod services;
pub mod utils;
