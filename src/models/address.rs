use std::fmt;

/// Ethereum address (20 bytes) derived from a secp256k1 public key.
///
/// Equality is byte-wise, so address comparison is inherently
/// case-insensitive; casing only exists in the textual forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvmAddress(pub [u8; 20]);

impl EvmAddress {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 checksummed form, `0x`-prefixed.
    pub fn to_checksum(&self) -> String {
        alloy::primitives::Address::from(self.0).to_checksum(None)
    }
}

impl From<[u8; 20]> for EvmAddress {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_checksum())
    }
}
