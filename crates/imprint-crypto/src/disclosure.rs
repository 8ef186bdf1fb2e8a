//! # Disclosure Engine
//!
//! Reveals a subset of a fingerprinted record together with the minimum
//! set of sibling hashes a verifier needs to recompute the imprint.
//!
//! ## Proof layout
//!
//! - `revealed`: `(path, value, salt)` per revealed leaf, in tree order.
//! - `siblings`: the compact multi-proof, ordered by
//!   [`sibling_positions`]. For an empty disclosure it is the root alone.
//!
//! ## Security Invariant
//!
//! Unrevealed leaves contribute only hashes. No salt or value of a hidden
//! leaf ever enters a proof, so low-entropy hidden values cannot be
//! recovered by dictionary search.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use imprint_core::{Hash256, Imprint, LeafValue, SchemaId};
use imprint_schema::{PropertyPath, Schema};

use crate::error::{DisclosureError, MalformedProofError};
use crate::fingerprint::Fingerprint;
use crate::salt::Salt;
use crate::sha256::{leaf_hash, node_hash};
use crate::tree::{level_widths, sibling_positions, NodePosition};

/// One revealed property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedLeaf {
    /// Path from the schema root.
    pub path: PropertyPath,
    /// The revealed value.
    pub value: LeafValue,
    /// The leaf's salt.
    pub salt: Salt,
}

/// Revealed values plus the sibling hashes that bind them to an imprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosureProof {
    /// Schema the fingerprint was built against.
    pub schema_id: SchemaId,
    /// Revealed leaves in tree order.
    pub revealed: Vec<RevealedLeaf>,
    /// Compact multi-proof sibling hashes.
    pub siblings: Vec<Hash256>,
}

impl DisclosureProof {
    /// Paths of the revealed leaves.
    pub fn revealed_paths(&self) -> Vec<&PropertyPath> {
        self.revealed.iter().map(|r| &r.path).collect()
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Decode from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedProofError::Decode`] on malformed input.
    pub fn from_json(s: &str) -> Result<Self, MalformedProofError> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Build a proof revealing the leaves named by `paths`.
///
/// A path may name a leaf or a nested group, in which case every leaf
/// under the group is revealed. Requesting a path twice is harmless.
///
/// # Errors
///
/// Returns [`DisclosureError::UnknownPath`] for a path that matches no leaf.
pub fn disclose(
    fingerprint: &Fingerprint,
    paths: &[PropertyPath],
) -> Result<DisclosureProof, DisclosureError> {
    for (position, leaf) in fingerprint.leaves.iter().enumerate() {
        if leaf.index as usize != position {
            return Err(DisclosureError::CorruptFingerprint {
                position,
                index: leaf.index,
            });
        }
    }

    let mut known = BTreeSet::new();
    for path in paths {
        let mut matched = false;
        if !path.is_root() {
            for leaf in &fingerprint.leaves {
                if leaf.path.starts_with(path) {
                    known.insert(leaf.index as usize);
                    matched = true;
                }
            }
        }
        if !matched {
            return Err(DisclosureError::UnknownPath(path.clone()));
        }
    }

    let tree = fingerprint.tree();
    let siblings = if known.is_empty() {
        vec![tree.root()]
    } else {
        sibling_positions(tree.leaf_count(), &known)
            .into_iter()
            .map(|pos| tree.node(pos))
            .collect()
    };

    let revealed = known
        .iter()
        .filter_map(|&i| fingerprint.leaves.get(i))
        .map(|leaf| RevealedLeaf {
            path: leaf.path.clone(),
            value: leaf.value.clone(),
            salt: leaf.salt.clone(),
        })
        .collect();

    Ok(DisclosureProof {
        schema_id: fingerprint.schema_id,
        revealed,
        siblings,
    })
}

/// Check a proof against an imprint and the schema it claims.
///
/// Returns `Ok(true)` when the revealed leaves and siblings recompute the
/// imprint, `Ok(false)` when they recompute something else.
///
/// # Errors
///
/// Returns [`MalformedProofError`] for structurally invalid proofs: wrong
/// schema, unknown or duplicate paths, mistyped values, or a sibling count
/// that does not fit the tree shape.
pub fn verify(
    proof: &DisclosureProof,
    imprint: &Imprint,
    schema: &Schema,
) -> Result<bool, MalformedProofError> {
    let schema_id = schema.id()?;
    if proof.schema_id != schema_id {
        return Err(MalformedProofError::SchemaMismatch {
            expected: schema_id,
            found: proof.schema_id,
        });
    }

    let mut nodes: BTreeMap<usize, Hash256> = BTreeMap::new();
    for revealed in &proof.revealed {
        let slot = schema
            .leaf_slot(&revealed.path)
            .ok_or_else(|| MalformedProofError::UnknownPath(revealed.path.clone()))?;
        if revealed.value.kind() != slot.kind {
            return Err(MalformedProofError::KindMismatch {
                path: revealed.path.clone(),
                expected: slot.kind,
                found: revealed.value.kind(),
            });
        }
        let hash = leaf_hash(&revealed.salt, &revealed.value);
        if nodes.insert(slot.index as usize, hash).is_some() {
            return Err(MalformedProofError::DuplicatePath(revealed.path.clone()));
        }
    }

    let computed = if nodes.is_empty() {
        match proof.siblings.as_slice() {
            [root] => *root,
            other => {
                return Err(MalformedProofError::SiblingCount {
                    expected: 1,
                    found: other.len(),
                })
            }
        }
    } else {
        recompute_root(schema.leaf_count(), nodes, &proof.siblings)?
    };

    Ok(bool::from(
        computed.as_bytes()[..].ct_eq(&imprint.root().as_bytes()[..]),
    ))
}

fn recompute_root(
    leaf_count: usize,
    mut nodes: BTreeMap<usize, Hash256>,
    siblings: &[Hash256],
) -> Result<Hash256, MalformedProofError> {
    let known: BTreeSet<usize> = nodes.keys().copied().collect();
    let positions = sibling_positions(leaf_count, &known);
    if positions.len() != siblings.len() {
        return Err(MalformedProofError::SiblingCount {
            expected: positions.len(),
            found: siblings.len(),
        });
    }
    let provided: HashMap<NodePosition, Hash256> =
        positions.into_iter().zip(siblings.iter().copied()).collect();

    for (level, &width) in level_widths(leaf_count).iter().enumerate() {
        if width <= 1 {
            break;
        }
        let lookup = |i: usize| {
            nodes
                .get(&i)
                .or_else(|| provided.get(&(level, i)))
                .copied()
                .unwrap_or(Hash256::ZERO)
        };
        let mut next = BTreeMap::new();
        for &idx in nodes.keys() {
            let parent = idx / 2;
            if next.contains_key(&parent) {
                continue;
            }
            let left = lookup(parent * 2);
            let right = lookup(parent * 2 + 1);
            next.insert(parent, node_hash(&left, &right));
        }
        nodes = next;
    }

    Ok(nodes.get(&0).copied().unwrap_or(Hash256::ZERO))
}
