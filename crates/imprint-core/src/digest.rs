//! # 32-Byte Digests
//!
//! Defines [`Hash256`], the raw SHA-256 output carried through the imprint
//! tree, and [`Imprint`], the root digest of a fingerprinted record. The
//! imprint is the only value ever published to the network.
//!
//! ## Encoding
//!
//! Digests serialize as 64 lowercase hex characters without a prefix, which
//! is the form submitted on-network. [`Imprint::to_prefixed_hex`] produces
//! the `0x`-prefixed display form. Parsing accepts either.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// A raw 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    /// The all-zero digest used to pad odd tree levels.
    pub const ZERO: Hash256 = Hash256([0u8; 32]);

    /// Wrap raw digest bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Access the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, no prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse 64 hex characters, with or without a `0x` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDigest`] if the string is not
    /// exactly 32 bytes of hex.
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(body, &mut bytes)
            .map_err(|_| ValidationError::InvalidDigest(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Hash256 {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// The Merkle-root fingerprint of a schema-conformant asset record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Imprint(Hash256);

impl Imprint {
    /// Wrap a tree root as an imprint.
    pub const fn new(root: Hash256) -> Self {
        Self(root)
    }

    /// The underlying root digest.
    pub fn root(&self) -> &Hash256 {
        &self.0
    }

    /// Hex without prefix, the on-network submission form.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    /// `0x`-prefixed hex for display.
    pub fn to_prefixed_hex(&self) -> String {
        format!("0x{}", self.0.to_hex())
    }

    /// Parse an imprint from hex, with or without `0x`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDigest`] on malformed input.
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        Hash256::from_hex(s).map(Self)
    }
}

impl fmt::Display for Imprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_prefixed_hex())
    }
}

impl FromStr for Imprint {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip_without_prefix() {
        let h = Hash256::new([0xab; 32]);
        let s = h.to_hex();
        assert_eq!(s.len(), 64);
        assert!(!s.starts_with("0x"));
        assert_eq!(Hash256::from_hex(&s).unwrap(), h);
    }

    #[test]
    fn accepts_prefixed_hex() {
        let h = Hash256::new([0x01; 32]);
        let prefixed = format!("0x{}", h.to_hex());
        assert_eq!(Hash256::from_hex(&prefixed).unwrap(), h);
    }

    #[test]
    fn rejects_short_and_non_hex() {
        assert!(Hash256::from_hex("abcd").is_err());
        assert!(Hash256::from_hex(&"zz".repeat(32)).is_err());
        assert!(Hash256::from_hex(&"00".repeat(33)).is_err());
    }

    #[test]
    fn imprint_display_is_prefixed() {
        let imprint = Imprint::new(Hash256::new([0x11; 32]));
        assert!(imprint.to_string().starts_with("0x"));
        assert_eq!(imprint.to_hex(), "11".repeat(32));
    }

    #[test]
    fn serde_uses_bare_hex() {
        let imprint = Imprint::new(Hash256::new([0x22; 32]));
        let json = serde_json::to_string(&imprint).unwrap();
        assert_eq!(json, format!("\"{}\"", "22".repeat(32)));
        let back: Imprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, imprint);
    }

    #[test]
    fn zero_constant_is_all_zero() {
        assert_eq!(Hash256::ZERO.as_bytes(), &[0u8; 32]);
    }
}
