//! # Error Types
//!
//! Errors raised by the foundational types of this crate. Higher layers
//! (schema, crypto, ledger) define their own error enums and wrap these
//! where a core value fails to parse or canonicalize.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Validation failure while constructing a core newtype.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A digest string was not valid hex or not exactly 32 bytes.
    #[error("invalid 32-byte hex digest: {0:?}")]
    InvalidDigest(String),

    /// An account identifier did not match `0x` + 40 hex digits.
    #[error("invalid account id: {0:?} (expected 0x followed by 40 hex digits)")]
    InvalidAccountId(String),

    /// A transaction handle was empty.
    #[error("transaction handle must not be empty")]
    EmptyTransactionHandle,

    /// An asset identifier of zero was supplied; ids start at 1.
    #[error("asset id must be at least 1")]
    ZeroAssetId,
}
