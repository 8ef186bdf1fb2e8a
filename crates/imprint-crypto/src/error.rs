//! # Cryptographic Error Types
//!
//! [`FingerprintError`] and [`DisclosureError`] are raised by the producer
//! side. [`MalformedProofError`] is raised by the verifier only for proofs
//! that are structurally invalid; a well-formed proof that does not match
//! the imprint is `Ok(false)`, not an error.

use thiserror::Error;

use imprint_core::{LeafKind, SchemaId};
use imprint_schema::{PropertyPath, RecordSchemaMismatch, SchemaError};

/// Fingerprinting failure.
#[derive(Error, Debug)]
pub enum FingerprintError {
    /// The record does not conform to the schema.
    #[error(transparent)]
    Mismatch(#[from] RecordSchemaMismatch),

    /// The number of supplied salts differs from the schema's leaf count.
    #[error("expected {expected} salts, got {found}")]
    SaltCount {
        /// Leaf count of the schema.
        expected: usize,
        /// Salts supplied.
        found: usize,
    },

    /// The schema is invalid or cannot be hashed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Failure building a disclosure proof.
#[derive(Error, Debug)]
pub enum DisclosureError {
    /// A requested path names neither a leaf nor a nested group.
    #[error("unknown property path: {0}")]
    UnknownPath(PropertyPath),

    /// The fingerprint's leaves are not numbered `0..n` in order.
    #[error("fingerprint leaf {position} carries index {index}")]
    CorruptFingerprint {
        /// Position in the leaf list.
        position: usize,
        /// Index recorded on the leaf.
        index: u32,
    },
}

/// A disclosure proof that is structurally invalid.
#[derive(Error, Debug)]
pub enum MalformedProofError {
    /// The proof was built against a different schema.
    #[error("proof schema {found} does not match schema {expected}")]
    SchemaMismatch {
        /// Id of the schema verified against.
        expected: SchemaId,
        /// Id carried by the proof.
        found: SchemaId,
    },

    /// A revealed path is not a leaf of the schema.
    #[error("revealed path {0} is not a leaf of the schema")]
    UnknownPath(PropertyPath),

    /// A path is revealed more than once.
    #[error("revealed path {0} appears more than once")]
    DuplicatePath(PropertyPath),

    /// A revealed value has the wrong kind for its position.
    #[error("revealed value at {path} is {found}, schema declares {expected}")]
    KindMismatch {
        /// Path of the revealed leaf.
        path: PropertyPath,
        /// Kind the schema declares.
        expected: LeafKind,
        /// Kind of the revealed value.
        found: LeafKind,
    },

    /// The sibling list does not fit the claimed tree shape.
    #[error("expected {expected} sibling hashes, got {found}")]
    SiblingCount {
        /// Siblings the tree shape requires.
        expected: usize,
        /// Siblings supplied.
        found: usize,
    },

    /// The schema could not be hashed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The proof document could not be decoded.
    #[error("proof decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
