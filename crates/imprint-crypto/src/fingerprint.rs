//! # Fingerprint Engine
//!
//! Turns a schema-conformant [`AssetRecord`] into an [`Imprint`] plus the
//! private leaf set needed to disclose fields later.
//!
//! ## Pipeline
//!
//! 1. Check the record against the schema (every offending path reported).
//! 2. Per leaf in schema order: salt, canonical encoding, salted hash.
//! 3. Build the [`ImprintTree`] and take its root.
//!
//! ## Security Invariant
//!
//! The returned [`Fingerprint`] holds every salt. It must be stored
//! privately by the producer; only [`Fingerprint::imprint`] is published.

use serde::{Deserialize, Serialize};

use imprint_core::{Hash256, Imprint, LeafValue, SchemaId};
use imprint_schema::{AssetRecord, PropertyPath, Schema};

use crate::error::FingerprintError;
use crate::salt::Salt;
use crate::sha256::leaf_hash;
use crate::tree::ImprintTree;

/// One fingerprinted property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    /// Position in the imprint tree.
    pub index: u32,
    /// Path from the schema root.
    pub path: PropertyPath,
    /// Secret salt mixed into the hash.
    pub salt: Salt,
    /// The property value.
    pub value: LeafValue,
    /// `SHA256(salt || canonical_encode(value))`.
    pub value_hash: Hash256,
}

/// The result of fingerprinting a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Schema the record was fingerprinted against.
    pub schema_id: SchemaId,
    /// Root of the imprint tree.
    pub imprint: Imprint,
    /// All leaves in tree order.
    pub leaves: Vec<Leaf>,
}

impl Fingerprint {
    /// Rebuild the imprint tree from the stored leaf hashes.
    pub fn tree(&self) -> ImprintTree {
        ImprintTree::build(self.leaves.iter().map(|l| l.value_hash).collect())
    }

    /// Whether every stored leaf hash matches its salt and value, and the
    /// stored imprint matches the rebuilt root.
    pub fn is_consistent(&self) -> bool {
        self.leaves
            .iter()
            .all(|l| leaf_hash(&l.salt, &l.value) == l.value_hash)
            && self.tree().root() == *self.imprint.root()
    }

    /// Split into schema id, imprint, and leaves.
    pub fn into_parts(self) -> (SchemaId, Imprint, Vec<Leaf>) {
        (self.schema_id, self.imprint, self.leaves)
    }
}

/// Fingerprint a record with fresh OS-random salts.
///
/// # Errors
///
/// Returns [`FingerprintError::Mismatch`] if the record does not conform to
/// the schema.
pub fn imprint(record: &AssetRecord, schema: &Schema) -> Result<Fingerprint, FingerprintError> {
    let salts = (0..schema.leaf_count()).map(|_| Salt::random()).collect();
    imprint_with_salts(record, schema, salts)
}

/// Fingerprint a record with caller-supplied salts, one per leaf in tree
/// order. Identical inputs give bit-identical fingerprints.
///
/// # Errors
///
/// Returns [`FingerprintError::Mismatch`] if the record does not conform to
/// the schema and [`FingerprintError::SaltCount`] if the salt count differs
/// from the leaf count.
pub fn imprint_with_salts(
    record: &AssetRecord,
    schema: &Schema,
    salts: Vec<Salt>,
) -> Result<Fingerprint, FingerprintError> {
    schema.validate()?;
    let values = record.leaf_values(schema)?;
    let slots = schema.leaf_slots();
    if salts.len() != slots.len() {
        return Err(FingerprintError::SaltCount {
            expected: slots.len(),
            found: salts.len(),
        });
    }

    let leaves: Vec<Leaf> = slots
        .into_iter()
        .zip(values)
        .zip(salts)
        .map(|((slot, value), salt)| Leaf {
            index: slot.index,
            path: slot.path,
            value_hash: leaf_hash(&salt, value),
            value: value.clone(),
            salt,
        })
        .collect();

    let tree = ImprintTree::build(leaves.iter().map(|l| l.value_hash).collect());
    Ok(Fingerprint {
        schema_id: schema.id()?,
        imprint: Imprint::new(tree.root()),
        leaves,
    })
}
