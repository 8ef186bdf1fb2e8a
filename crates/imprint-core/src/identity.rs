//! # Identity Newtypes
//!
//! Each identifier is a distinct type: an [`AssetId`] cannot be passed where
//! a [`MutationId`] is expected.
//!
//! ## Validation
//!
//! String-based identifiers ([`AccountId`], [`TransactionHandle`]) validate at
//! construction. [`MutationId`] is UUID-based and always valid.
//! [`SchemaId`] is content-derived and only produced by hashing a schema.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::digest::Hash256;
use crate::error::ValidationError;

/// Content-derived identifier of a registered schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaId(Hash256);

impl SchemaId {
    /// Wrap a schema content digest.
    pub const fn from_digest(digest: Hash256) -> Self {
        Self(digest)
    }

    /// The underlying digest.
    pub fn digest(&self) -> &Hash256 {
        &self.0
    }

    /// Lowercase hex, no prefix.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl FromStr for SchemaId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash256::from_hex(s).map(Self)
    }
}

/// A network account or contract address: `0x` followed by 40 hex digits.
///
/// Stored lowercase so that equality does not depend on checksum casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Parse and normalize an account identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAccountId`] if the value is not
    /// `0x` followed by exactly 40 hex digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let body = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .ok_or_else(|| ValidationError::InvalidAccountId(raw.clone()))?;
        if body.len() != 40 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidAccountId(raw));
        }
        Ok(Self(format!("0x{}", body.to_ascii_lowercase())))
    }

    /// Address from its 20 raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// Access the normalized address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Ledger-scoped asset identifier. Ids start at 1 and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(u64);

impl AssetId {
    /// Construct an asset id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroAssetId`] for zero.
    pub fn new(value: u64) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError::ZeroAssetId);
        }
        Ok(Self(value))
    }

    /// The id assigned under the sequential-balance policy: `balance + 1`.
    pub fn after_balance(balance: u64) -> Self {
        Self(balance.saturating_add(1))
    }

    /// The raw integer value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a tracked mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MutationId(Uuid);

impl MutationId {
    /// Create a new random mutation identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a mutation identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MutationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle returned by the network for a submitted transaction
/// (typically the transaction hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TransactionHandle(String);

impl TransactionHandle {
    /// Wrap a transaction handle.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTransactionHandle`] for a blank value.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.trim().is_empty() {
            return Err(ValidationError::EmptyTransactionHandle);
        }
        Ok(Self(s))
    }

    /// Handle for a transaction identified by its hash.
    pub fn from_hash(hash: &Hash256) -> Self {
        Self(format!("0x{}", hash.to_hex()))
    }

    /// Access the handle string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for TransactionHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for TransactionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
