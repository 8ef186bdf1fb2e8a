//! # Canonical Serialization
//!
//! `CanonicalBytes` is the only input accepted by [`sha256_digest`], which
//! computes content identifiers such as [`SchemaId`](crate::SchemaId).
//!
//! Serialization follows RFC 8785 (JSON Canonicalization Scheme) through
//! `serde_jcs`: sorted object keys, compact separators. Arrays keep their
//! order, so ordered structures (schema property lists) hash with their
//! ordering intact. Floats are rejected because their JCS rendering is a
//! source of cross-implementation drift.
//!
//! Leaf values of a record are NOT encoded through this path; they use the
//! fixed binary encoding in [`crate::value`].

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::digest::Hash256;
use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// The inner buffer is private; the only constructor is
/// [`CanonicalBytes::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizationError::FloatRejected`] if the value contains
    /// a non-integer number, or [`CanonicalizationError::SerializationFailed`]
    /// if serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if n.is_f64() && !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
    }
}

/// SHA-256 over canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> Hash256 {
    let out: [u8; 32] = Sha256::digest(data.as_bytes()).into();
    Hash256::new(out)
}
