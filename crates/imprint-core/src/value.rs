//! # Leaf Values and Their Canonical Encoding
//!
//! A leaf value is the content of one scalar record property. Its canonical
//! encoding is the byte string that gets salted and hashed into a leaf:
//!
//! | Kind     | Encoding                                              |
//! |----------|-------------------------------------------------------|
//! | `Number` | 8 bytes, big-endian two's complement (`i64`)          |
//! | `String` | 4-byte big-endian length prefix, then UTF-8 bytes     |
//! | `Bytes`  | raw bytes as-is                                       |
//!
//! The encoding carries no kind tag: the schema fixes the kind of every
//! leaf position, and verification checks revealed values against it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The scalar kinds a leaf can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafKind {
    /// UTF-8 text.
    String,
    /// Opaque bytes.
    Bytes,
    /// Signed 64-bit integer.
    Number,
}

impl LeafKind {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Number => "number",
        }
    }
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete scalar value of a record property.
///
/// Serializes self-describingly (`{"kind": "string", "value": "..."}`,
/// bytes as hex) so disclosure proofs can be read without the schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LeafValue {
    /// UTF-8 text.
    String(String),
    /// Opaque bytes, hex-encoded on the wire.
    Bytes(#[serde(with = "hex_bytes")] Vec<u8>),
    /// Signed 64-bit integer.
    Number(i64),
}

impl LeafValue {
    /// The kind of this value.
    pub fn kind(&self) -> LeafKind {
        match self {
            Self::String(_) => LeafKind::String,
            Self::Bytes(_) => LeafKind::Bytes,
            Self::Number(_) => LeafKind::Number,
        }
    }

    /// Canonical byte encoding hashed into the leaf.
    pub fn canonical_encode(&self) -> Vec<u8> {
        match self {
            Self::Number(n) => n.to_be_bytes().to_vec(),
            Self::String(s) => {
                let bytes = s.as_bytes();
                // Strings longer than u32::MAX bytes cannot be produced by
                // any record loader; saturate rather than wrap.
                let len = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
                let mut out = Vec::with_capacity(4 + bytes.len());
                out.extend_from_slice(&len.to_be_bytes());
                out.extend_from_slice(bytes);
                out
            }
            Self::Bytes(b) => b.clone(),
        }
    }
}

impl From<&str> for LeafValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for LeafValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for LeafValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<Vec<u8>> for LeafValue {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let body = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(body).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_is_fixed_width_big_endian() {
        assert_eq!(
            LeafValue::Number(1).canonical_encode(),
            vec![0, 0, 0, 0, 0, 0, 0, 1]
        );
        assert_eq!(LeafValue::Number(-1).canonical_encode(), vec![0xff; 8]);
    }

    #[test]
    fn string_is_length_prefixed() {
        assert_eq!(
            LeafValue::from("ab").canonical_encode(),
            vec![0, 0, 0, 2, b'a', b'b']
        );
        assert_eq!(LeafValue::from("").canonical_encode(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn bytes_are_raw() {
        assert_eq!(
            LeafValue::Bytes(vec![1, 2, 3]).canonical_encode(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn utf8_length_counts_bytes_not_chars() {
        let enc = LeafValue::from("é").canonical_encode();
        assert_eq!(&enc[..4], &[0, 0, 0, 2]);
    }

    #[test]
    fn serde_is_self_describing() {
        let v = LeafValue::Bytes(vec![0xde, 0xad]);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "bytes", "value": "dead"}));
        let back: LeafValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, v);

        let n: LeafValue =
            serde_json::from_value(serde_json::json!({"kind": "number", "value": -7})).unwrap();
        assert_eq!(n, LeafValue::Number(-7));
    }
}
