//! # Leaf Salts
//!
//! A fresh 32-byte salt per leaf keeps hidden values out of reach of
//! dictionary attacks: without the salt, a leaf hash reveals nothing about
//! a low-entropy value such as a year or a yes/no flag.
//!
//! Salts are secrets until disclosed. They are zeroized on drop and
//! redacted from `Debug` output.

use std::fmt;

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// 32 random bytes mixed into one leaf hash.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Salt([u8; 32]);

impl Salt {
    /// Draw a salt from the operating system RNG.
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Wrap known salt bytes (deterministic fingerprinting, tests).
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw salt bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, no prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse 64 hex characters, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let body = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(body, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Salt([REDACTED])")
    }
}

impl Serialize for Salt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Salt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_salts_differ() {
        assert_ne!(Salt::random(), Salt::random());
    }

    #[test]
    fn debug_is_redacted() {
        let s = Salt::from_bytes([0xab; 32]);
        assert!(!format!("{s:?}").contains("ab"));
    }

    #[test]
    fn hex_serde() {
        let s = Salt::from_bytes([7; 32]);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, format!("\"{}\"", "07".repeat(32)));
        let back: Salt = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
        assert!(Salt::from_hex("abcd").is_err());
        assert_eq!(Salt::from_hex(&format!("0x{}", "07".repeat(32))).unwrap(), s);
    }
}
