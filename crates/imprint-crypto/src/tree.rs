//! # Imprint Tree
//!
//! Binary Merkle tree over leaf hashes in schema order, built bottom-up.
//! A level with an odd number of nodes is padded on the right with
//! [`Hash256::ZERO`]; the last node is never duplicated.
//!
//! ```text
//!            root
//!          /      \
//!        n01       n2Z
//!       /   \     /   \
//!      l0   l1   l2   ZERO
//! ```
//!
//! ## Compact multi-proofs
//!
//! [`sibling_positions`] lists, for a set of known leaf indices, every node
//! a verifier needs but cannot compute. It walks the tree level by level
//! and, within a level, in ascending index order. Positions that fall on
//! padding are omitted since the verifier supplies the zero hash itself.
//! Both proof construction and verification use this one traversal, which
//! fixes the order in which sibling hashes are emitted and consumed.

use std::collections::BTreeSet;

use imprint_core::Hash256;

use crate::sha256::node_hash;

/// A node position: `(level, index)`, level 0 being the leaves.
pub type NodePosition = (usize, usize);

/// All levels of an imprint tree, leaves first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImprintTree {
    levels: Vec<Vec<Hash256>>,
}

impl ImprintTree {
    /// Build the tree over `leaves`. An empty input yields a zero root.
    pub fn build(leaves: Vec<Hash256>) -> Self {
        let mut levels = vec![leaves];
        while let Some(level) = levels.last() {
            if level.len() <= 1 {
                break;
            }
            let next = level
                .chunks(2)
                .map(|pair| match pair {
                    [l, r] => node_hash(l, r),
                    [l] => node_hash(l, &Hash256::ZERO),
                    _ => Hash256::ZERO,
                })
                .collect();
            levels.push(next);
        }
        Self { levels }
    }

    /// The root digest.
    pub fn root(&self) -> Hash256 {
        self.levels
            .last()
            .and_then(|l| l.first())
            .copied()
            .unwrap_or(Hash256::ZERO)
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Node hash at a position; padding positions read as zero.
    pub fn node(&self, (level, index): NodePosition) -> Hash256 {
        self.levels
            .get(level)
            .and_then(|l| l.get(index))
            .copied()
            .unwrap_or(Hash256::ZERO)
    }
}

/// Width of each level of a tree with `leaf_count` leaves, leaves first,
/// ending at the single-node root level.
pub fn level_widths(leaf_count: usize) -> Vec<usize> {
    let mut widths = vec![leaf_count];
    let mut width = leaf_count;
    while width > 1 {
        width = width.div_ceil(2);
        widths.push(width);
    }
    widths
}

/// Positions of the sibling hashes a verifier needs to recompute the root
/// from the leaves in `known`, in emission order.
pub fn sibling_positions(leaf_count: usize, known: &BTreeSet<usize>) -> Vec<NodePosition> {
    let mut out = Vec::new();
    let mut current: BTreeSet<usize> = known.clone();
    for (level, &width) in level_widths(leaf_count).iter().enumerate() {
        if width <= 1 {
            break;
        }
        for &idx in &current {
            let sibling = idx ^ 1;
            if current.contains(&sibling) || sibling >= width {
                continue;
            }
            out.push((level, sibling));
        }
        current = current.iter().map(|i| i / 2).collect();
    }
    out
}
