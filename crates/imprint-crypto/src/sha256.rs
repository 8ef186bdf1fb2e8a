//! # Tree Hashing
//!
//! - Leaf: `SHA256(salt || canonical_encode(value))`.
//! - Node: `SHA256(left || right)`.
//!
//! Leaves and nodes share no domain-separation prefix; the tree shape is
//! fixed by the schema, so a verifier never has to tell them apart.

use sha2::{Digest, Sha256};

use imprint_core::{Hash256, LeafValue};

use crate::salt::Salt;

/// Salted hash of one leaf value.
pub fn leaf_hash(salt: &Salt, value: &LeafValue) -> Hash256 {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(value.canonical_encode());
    Hash256::new(hasher.finalize().into())
}

/// Parent hash of two child nodes.
pub fn node_hash(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut hasher = Sha256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    Hash256::new(hasher.finalize().into())
}
